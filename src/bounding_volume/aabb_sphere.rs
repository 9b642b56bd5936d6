use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::Sphere;

/// Computes the Axis-Aligned Bounding Box of a sphere centered at `center`.
///
/// The result is `center ± radius` on every axis.
#[inline]
pub fn sphere_aabb(center: &Point<Real>, radius: Real) -> Aabb {
    Aabb::new(
        *center + Vector::repeat(-radius),
        *center + Vector::repeat(radius),
    )
}

impl Sphere {
    /// Computes the world-space AABB of this sphere.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        sphere_aabb(&self.center, self.radius)
    }
}
