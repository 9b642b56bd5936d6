use crate::{assert_same_tree, check_tree, grid_spheres, random_spheres, set_aabb};
use approx::assert_relative_eq;
use sahbvh3d::bounding_volume::Aabb;
use sahbvh3d::math::Point;
use sahbvh3d::partitioning::{Bvh, BvhBuildError, BvhBuildOptions, BvhNode, BvhWorkspace};
use sahbvh3d::shape::{Sphere, SphereSoa};

#[test]
fn single_primitive() {
    let spheres = [Sphere::new(Point::new(1.0, 2.0, 3.0), 0.5)];
    let mut bvh = Bvh::new();

    assert_eq!(bvh.build(&spheres[..], &mut BvhWorkspace::default()), 1);

    let root = bvh.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.count(), 1);
    assert_eq!(root.contents(), 0);
    assert_eq!(root.aabb(), spheres[0].aabb());
    check_tree(&bvh, &spheres);
}

#[test]
fn two_widely_separated_spheres() {
    let spheres = vec![
        Sphere::new(Point::new(-10.0, 0.0, 0.0), 0.1),
        Sphere::new(Point::new(10.0, 0.0, 0.0), 0.1),
    ];
    let bvh = Bvh::from_primitives(&spheres);

    assert_eq!(bvh.node_count(), 3);

    let root = bvh.root().unwrap();
    assert_eq!(root.children(), Some([1, 2]));
    assert_relative_eq!(root.mins().x, -10.1);
    assert_relative_eq!(root.maxs().x, 10.1);

    let mut leaf_contents: Vec<u32> = bvh
        .leaves()
        .map(|(id, leaf)| {
            assert_eq!(leaf.count(), 1);
            bvh.leaf_primitives(id)[0]
        })
        .collect();
    leaf_contents.sort_unstable();
    assert_eq!(leaf_contents, [0, 1]);

    // The left child holds the sphere with the smallest x.
    assert_eq!(bvh.leaf_primitives(1), [0]);
    check_tree(&bvh, &spheres);
}

#[test]
fn clustered_primitives_stay_in_one_leaf() {
    // The largest extent is along x, where every center has the same coordinate.
    let spheres = vec![
        Sphere::new(Point::origin(), 2.0),
        Sphere::new(Point::new(0.0, 0.01, 0.0), 1.0),
        Sphere::new(Point::new(0.0, 0.0, 0.01), 1.0),
    ];
    let bvh = Bvh::from_primitives(&spheres);

    assert_eq!(bvh.node_count(), 1);
    assert_eq!(bvh.root().unwrap().count(), 3);
    assert_eq!(bvh.leaf_count(), 1);
    check_tree(&bvh, &spheres);
}

#[test]
fn nearby_distinct_centers_are_split() {
    // Tiny offsets along the split axis are enough for the SAH to separate overlapping spheres.
    let spheres = vec![
        Sphere::new(Point::origin(), 1.0),
        Sphere::new(Point::new(0.005, 0.0, 0.0), 1.0),
        Sphere::new(Point::new(0.01, 0.0, 0.0), 1.0),
    ];
    let bvh = Bvh::from_primitives(&spheres);

    assert_eq!(bvh.node_count(), 5);
    assert_eq!(bvh.leaf_count(), 3);
    check_tree(&bvh, &spheres);
}

#[test]
fn identical_spheres_stay_in_one_leaf() {
    let spheres = vec![Sphere::new(Point::new(1.0, 1.0, 1.0), 1.0); 40];
    let bvh = Bvh::from_primitives(&spheres);

    assert_eq!(bvh.node_count(), 1);
    check_tree(&bvh, &spheres);
}

#[test]
fn empty_input() {
    let spheres: Vec<Sphere> = Vec::new();
    let mut bvh = Bvh::new();
    assert!(bvh.root().is_none());

    assert_eq!(bvh.build(&spheres, &mut BvhWorkspace::default()), 1);

    let root = bvh.root().unwrap();
    assert_eq!(root.count(), 0);
    assert!(!root.aabb().is_valid());
    assert!(!bvh.root_aabb().is_valid());
    assert!(bvh.is_empty());
    assert_eq!(bvh.leaf_count(), 0);
    assert_eq!(bvh.subtree_depth(0), 1);
    assert_eq!(bvh.reachable_primitive_count(0), 0);
    check_tree(&bvh, &spheres);
}

#[test]
fn grid_is_fully_split() {
    let spheres = grid_spheres(2);
    let bvh = Bvh::from_primitives(&spheres);

    assert_eq!(bvh.node_count(), 15);
    assert_eq!(bvh.leaf_count(), 8);
    assert_eq!(bvh.subtree_depth(0), 4);
    assert_eq!(bvh.root_aabb(), set_aabb(&spheres));
    check_tree(&bvh, &spheres);
}

#[test]
fn random_scenes() {
    let mut workspace = BvhWorkspace::default();
    let mut bvh = Bvh::new();

    for (seed, count) in [(0, 2), (1, 3), (2, 15), (3, 16), (4, 17), (5, 100), (6, 1000)] {
        let spheres = random_spheres(seed, count, 50.0);
        let node_count = bvh.build(&spheres, &mut workspace);

        assert_eq!(node_count, bvh.node_count());
        assert_eq!(bvh.primitive_count(), count);
        assert_eq!(bvh.reachable_primitive_count(0), count);
        assert_eq!(bvh.root_aabb(), set_aabb(&spheres));
        check_tree(&bvh, &spheres);
    }
}

#[test]
fn build_is_deterministic() {
    let spheres = random_spheres(42, 300, 20.0);
    let a = Bvh::from_primitives(&spheres);

    let mut b = Bvh::new();
    let mut workspace = BvhWorkspace::default();
    // Dirty the workspace and the tree with another scene first.
    let _ = b.build(&random_spheres(7, 50, 5.0), &mut workspace);
    let _ = b.build(&spheres, &mut workspace);

    assert_same_tree(&a, &b);
}

#[test]
fn struct_of_arrays_matches_array_of_structs() {
    let spheres = random_spheres(3, 200, 30.0);
    let soa: SphereSoa = spheres.iter().copied().collect();

    let aos_bvh = Bvh::from_primitives(&spheres);
    let soa_bvh = Bvh::from_primitives(&soa);

    assert_same_tree(&aos_bvh, &soa_bvh);
    soa_bvh.assert_well_formed(&soa);
}

#[test]
fn aabbs_can_be_indexed() {
    let aabbs: Vec<Aabb> = random_spheres(11, 64, 10.0)
        .iter()
        .map(|sphere| sphere.aabb())
        .collect();
    let bvh = Bvh::from_primitives(&aabbs);

    assert_eq!(bvh.root_aabb(), set_aabb(&aabbs));
    bvh.assert_well_formed(&aabbs);
}

#[test]
fn every_bin_count_builds_valid_trees() {
    let spheres = random_spheres(5, 256, 40.0);
    let mut workspace = BvhWorkspace::default();
    let mut bvh = Bvh::new();

    for bin_count in 2..=16 {
        let options = BvhBuildOptions::with_bin_count(bin_count);
        let _ = bvh.build_with_options(&spheres, &mut workspace, &options);
        check_tree(&bvh, &spheres);
    }
}

#[test]
fn invalid_bin_counts_are_rejected() {
    let spheres = random_spheres(5, 8, 40.0);
    let mut workspace = BvhWorkspace::default();
    let mut bvh = Bvh::new();

    for bin_count in [0, 1, 17, 64] {
        let options = BvhBuildOptions::with_bin_count(bin_count);
        assert_eq!(
            bvh.try_build_with_options(&spheres, &mut workspace, &options),
            Err(BvhBuildError::InvalidBinCount(bin_count))
        );
    }

    assert!(bvh.root().is_none());
    assert_eq!(BvhBuildOptions::default().validate(), Ok(()));
}

#[test]
#[should_panic(expected = "invalid bin count 1")]
fn build_with_invalid_options_panics() {
    let spheres = random_spheres(5, 8, 40.0);
    let options = BvhBuildOptions::with_bin_count(1);
    let _ = Bvh::new().build_with_options(&spheres, &mut BvhWorkspace::default(), &options);
}

#[test]
fn custom_initial_permutation() {
    let spheres = random_spheres(9, 64, 25.0);
    let reversed: Vec<u32> = (0..64).rev().collect();
    let mut workspace = BvhWorkspace::default();
    let options = BvhBuildOptions::default();

    let mut a = Bvh::new();
    let mut b = Bvh::new();
    let _ = a.try_build_with_indices(&spheres, &reversed, &mut workspace, &options);
    let _ = b.try_build_with_indices(&spheres, &reversed, &mut workspace, &options);

    check_tree(&a, &spheres);
    assert_same_tree(&a, &b);

    // The identity permutation matches the regular build.
    let identity: Vec<u32> = (0..64).collect();
    let _ = b.try_build_with_indices(&spheres, &identity, &mut workspace, &options);
    assert_same_tree(&b, &Bvh::from_primitives(&spheres));
}

#[test]
fn invalid_permutations_are_rejected() {
    let spheres = random_spheres(1, 3, 10.0);
    let mut workspace = BvhWorkspace::default();
    let options = BvhBuildOptions::default();
    let mut bvh = Bvh::from_primitives(&spheres);
    let reference = bvh.clone();

    assert_eq!(
        bvh.try_build_with_indices(&spheres, &[0, 0, 1], &mut workspace, &options),
        Err(BvhBuildError::InvalidPermutation(0))
    );
    assert_eq!(
        bvh.try_build_with_indices(&spheres, &[0, 1, 5], &mut workspace, &options),
        Err(BvhBuildError::InvalidPermutation(5))
    );
    assert_eq!(
        bvh.try_build_with_indices(&spheres, &[0, 1], &mut workspace, &options),
        Err(BvhBuildError::IndexCountMismatch {
            expected: 3,
            found: 2
        })
    );

    // Failed builds leave the tree untouched.
    assert_same_tree(&bvh, &reference);
}

#[test]
fn rebuild_after_adding_primitives() {
    let mut spheres = random_spheres(8, 20, 10.0);
    let mut workspace = BvhWorkspace::default();
    let mut bvh = Bvh::new();
    let _ = bvh.build(&spheres, &mut workspace);

    spheres.push(Sphere::new(Point::new(100.0, 0.0, 0.0), 1.0));
    let _ = bvh.build(&spheres, &mut workspace);

    assert_eq!(bvh.primitive_count(), 21);
    assert_eq!(bvh.root_aabb().maxs.x, 101.0);
    check_tree(&bvh, &spheres);
}

#[test]
fn memory_size_accounts_for_the_arena() {
    let spheres = random_spheres(2, 100, 10.0);
    let bvh = Bvh::from_primitives(&spheres);

    let node_size = core::mem::size_of::<BvhNode>();

    assert!(bvh.heap_memory_size() >= 199 * node_size);
    assert!(bvh.total_memory_size() > bvh.heap_memory_size());
}

#[test]
fn error_messages() {
    assert_eq!(
        BvhBuildError::InvalidBinCount(20).to_string(),
        "invalid bin count 20, expected a value in 2..=16"
    );
    assert_eq!(
        BvhBuildError::ArenaTooSmall {
            required: 7,
            capacity: 6
        }
        .to_string(),
        "the node arena holds 6 nodes but at least 7 are needed"
    );
}
