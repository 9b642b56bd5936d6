//! Primitive shapes indexed by the bounding volume hierarchy.
//!
//! Spheres come in two memory layouts: an array of [`Sphere`] structs, or the columnar
//! [`SphereSoa`]. Both implement [`PrimitiveSet`](crate::partitioning::PrimitiveSet) and
//! feed the same tree builder.

pub use self::sphere::Sphere;
pub use self::sphere_soa::SphereSoa;

mod sphere;
mod sphere_soa;
