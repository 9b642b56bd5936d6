use sahbvh3d::math::{Point, Real};
use sahbvh3d::partitioning::{Bvh, BvhWorkspace};
use sahbvh3d::shape::Sphere;

const NUM_SPHERES: usize = 1_000;
const NUM_FRAMES: usize = 120;
const DT: Real = 1.0 / 60.0;

fn main() {
    let mut rng = oorandom::Rand32::new(0);
    let mut spheres: Vec<Sphere> = (0..NUM_SPHERES)
        .map(|_| {
            let center = Point::new(
                rng.rand_float() * 100.0 - 50.0,
                rng.rand_float() * 100.0 - 50.0,
                rng.rand_float() * 100.0 - 50.0,
            );
            Sphere::new(center, 0.2 + rng.rand_float())
        })
        .collect();
    let speeds: Vec<Real> = (0..NUM_SPHERES).map(|_| rng.rand_float() + 0.5).collect();

    // Build once, then only refit while the number of spheres doesn’t change.
    let mut workspace = BvhWorkspace::default();
    let mut bvh = Bvh::new();
    let node_count = bvh.build(&spheres, &mut workspace);
    println!(
        "Built {} nodes ({} leaves, depth {}) over {} spheres.",
        node_count,
        bvh.leaf_count(),
        bvh.subtree_depth(0),
        spheres.len()
    );

    for frame in 0..NUM_FRAMES {
        // Every sphere orbits the y axis.
        for (sphere, speed) in spheres.iter_mut().zip(&speeds) {
            let angle = speed * DT;
            let (sin, cos) = angle.sin_cos();
            let p = sphere.center;
            sphere.center = Point::new(cos * p.x - sin * p.z, p.y, sin * p.x + cos * p.z);
        }

        // Adding a sphere changes the topology: rebuild instead of refitting.
        if frame == NUM_FRAMES / 2 {
            spheres.push(Sphere::new(Point::origin(), 5.0));
            let node_count = bvh.build(&spheres, &mut workspace);
            println!("Frame {}: rebuilt {} nodes.", frame, node_count);
        } else {
            bvh.refit(&spheres);
        }

        if frame % 30 == 0 {
            let root = bvh.root_aabb();
            println!(
                "Frame {}: root AABB {:?} -> {:?}.",
                frame, root.mins, root.maxs
            );
        }
    }

    bvh.assert_well_formed(&spheres);
    println!(
        "Done. Memory used by the tree: {} bytes.",
        bvh.total_memory_size()
    );
}
