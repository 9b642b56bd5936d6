/*!
sahbvh
========

**sahbvh** builds and refits bounding volume hierarchies over 3D primitives (spheres in
particular) for ray-tracing style nearest-hit queries.

The tree is stored as a flat node arena plus a permutation of primitive indices, which makes it
cheap to upload as-is to a GPU buffer. Construction uses a binned surface area heuristic,
and per-frame motion is handled by a bottom-up refit that never changes the tree topology.

```rust
# #[cfg(feature = "f32")] {
use sahbvh3d::math::Point;
use sahbvh3d::partitioning::{Bvh, BvhWorkspace};
use sahbvh3d::shape::Sphere;

let mut spheres = vec![
    Sphere::new(Point::new(-10.0, 0.0, 0.0), 0.5),
    Sphere::new(Point::new(10.0, 0.0, 0.0), 0.5),
];

let mut workspace = BvhWorkspace::default();
let mut bvh = Bvh::new();
assert_eq!(bvh.build(&spheres, &mut workspace), 3);

// Move a sphere, then refit instead of rebuilding.
spheres[0].center.x = -20.0;
bvh.refit(&spheres);
assert_eq!(bvh.root_aabb().mins.x, -20.5);
# }
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![deny(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![no_std]

#[cfg(all(feature = "f32", feature = "f64"))]
core::compile_error!("The `f32` and `f64` features are mutually exclusive.");

extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod partitioning;
pub mod shape;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Point3, Vector3};

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;
}
