//! Bounding volumes.

#[doc(inline)]
pub use crate::bounding_volume::aabb::Aabb;
#[doc(inline)]
pub use crate::bounding_volume::bounding_volume::BoundingVolume;

#[doc(hidden)]
pub mod aabb;
mod aabb_sphere;
#[doc(hidden)]
pub mod bounding_volume;

/// Free functions for some special cases of bounding-volume computation.
pub mod details {
    pub use super::aabb_sphere::sphere_aabb;
}
