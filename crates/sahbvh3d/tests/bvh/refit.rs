use crate::{check_tree, grid_spheres, random_spheres, set_aabb};
use sahbvh3d::math::{Point, Real, Vector};
use sahbvh3d::partitioning::{Bvh, BvhWorkspace};
use sahbvh3d::shape::{Sphere, SphereSoa};

/// The nodes on the path from the root to the leaf containing `primitive`, leaf included.
fn ancestor_chain(bvh: &Bvh, primitive: u32) -> Vec<u32> {
    let mut parents = vec![None; bvh.node_count() as usize];

    for (node_id, node) in bvh.nodes().iter().enumerate() {
        if let Some([left, right]) = node.children() {
            parents[left as usize] = Some(node_id as u32);
            parents[right as usize] = Some(node_id as u32);
        }
    }

    let (leaf, _) = bvh
        .leaves()
        .find(|(id, _)| bvh.leaf_primitives(*id).contains(&primitive))
        .unwrap();

    let mut result = vec![leaf];
    while let Some(parent) = parents[*result.last().unwrap() as usize] {
        result.push(parent);
    }
    result
}

#[test]
fn refit_after_translation_only_updates_ancestors() {
    let mut spheres = grid_spheres(2);
    let mut bvh = Bvh::from_primitives(&spheres);
    let before = bvh.nodes().to_vec();

    // The sphere at (4, 0, 0) moves further away from the others.
    let moved = spheres
        .iter()
        .position(|s| s.center == Point::new(4.0, 0.0, 0.0))
        .unwrap();
    spheres[moved].translate(&Vector::new(5.0, 0.0, 0.0));
    bvh.refit(&spheres);

    let chain = ancestor_chain(&bvh, moved as u32);
    assert_eq!(*chain.last().unwrap(), 0);

    for (node_id, (old, new)) in before.iter().zip(bvh.nodes()).enumerate() {
        if chain.contains(&(node_id as u32)) {
            assert_ne!(old, new, "node {} should have been refit", node_id);
            assert_eq!(new.maxs().x, 9.5);
            assert!(new.contains_aabb(&spheres[moved].aabb()));
        } else {
            assert_eq!(old, new, "node {} shouldn’t have changed", node_id);
        }
    }

    // Refitting doesn’t change the topology.
    assert_eq!(before.len(), bvh.nodes().len());
    for (old, new) in before.iter().zip(bvh.nodes()) {
        assert_eq!(old.count(), new.count());
        assert_eq!(old.contents(), new.contents());
    }

    check_tree(&bvh, &spheres);
}

#[test]
fn refit_is_idempotent() {
    let mut spheres = random_spheres(21, 500, 30.0);
    let mut bvh = Bvh::from_primitives(&spheres);

    for sphere in &mut spheres {
        sphere.center.y += 3.0;
    }

    bvh.refit(&spheres);
    let first = bvh.clone();
    bvh.refit(&spheres);

    assert_eq!(first.nodes(), bvh.nodes());
    assert_eq!(first.primitive_indices(), bvh.primitive_indices());
}

#[test]
fn refit_without_motion_matches_build() {
    let spheres = random_spheres(4, 300, 30.0);
    let mut bvh = Bvh::from_primitives(&spheres);
    let built = bvh.clone();

    bvh.refit(&spheres);
    assert_eq!(built.nodes(), bvh.nodes());
}

#[test]
fn refit_tracks_random_motion() {
    let mut spheres = random_spheres(12, 400, 20.0);
    let displacements = random_spheres(13, 400, 5.0);
    let mut bvh = Bvh::new();
    let _ = bvh.build(&spheres, &mut BvhWorkspace::default());
    let indices = bvh.primitive_indices().to_vec();

    for frame in 0..10 {
        for (sphere, displacement) in spheres.iter_mut().zip(&displacements) {
            sphere.translate(&(displacement.center.coords * 0.1 * frame as Real));
        }

        bvh.refit(&spheres);
        assert_eq!(bvh.primitive_indices(), &indices[..]);
        assert_eq!(bvh.root_aabb(), set_aabb(&spheres));
        check_tree(&bvh, &spheres);
    }
}

#[test]
fn refit_struct_of_arrays() {
    let spheres = random_spheres(14, 100, 20.0);
    let mut soa: SphereSoa = spheres.iter().copied().collect();
    let mut bvh = Bvh::from_primitives(&soa);

    soa.translate(3, &Vector::new(0.0, -50.0, 0.0));
    soa.set_center(7, Point::new(80.0, 0.0, 0.0));
    bvh.refit(&soa);

    assert_eq!(bvh.root_aabb(), set_aabb(&soa));
    assert_eq!(bvh.root_aabb().maxs.x, 80.0 + soa.radius(7));
    bvh.assert_well_formed(&soa);
}

#[test]
fn refit_empty_tree() {
    let spheres: Vec<Sphere> = Vec::new();
    let mut bvh = Bvh::from_primitives(&spheres);
    let built = bvh.clone();

    bvh.refit(&spheres);
    assert_eq!(built.nodes(), bvh.nodes());
    check_tree(&bvh, &spheres);

    // Refitting a tree that was never built is a no-op.
    let mut unbuilt = Bvh::new();
    unbuilt.refit(&spheres);
    assert_eq!(unbuilt.node_count(), 0);
}

#[test]
#[should_panic(expected = "number of primitives changed")]
fn refit_with_different_primitive_count_panics() {
    let mut spheres = random_spheres(1, 10, 20.0);
    let mut bvh = Bvh::from_primitives(&spheres);

    spheres.push(Sphere::new(Point::origin(), 1.0));
    bvh.refit(&spheres);
}
