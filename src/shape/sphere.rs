use crate::math::{Point, Real, Vector};

/// A sphere shape positioned in world-space.
///
/// Only the `center` is expected to change between frames. Moving a sphere doesn't
/// invalidate a tree built over it: a [refit](crate::partitioning::Bvh::refit) is enough.
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Point<Real>,
    /// The radius of the sphere.
    pub radius: Real,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius.
    #[inline]
    pub fn new(center: Point<Real>, radius: Real) -> Sphere {
        Sphere { center, radius }
    }

    /// Moves the center of this sphere by `translation`.
    #[inline]
    pub fn translate(&mut self, translation: &Vector<Real>) {
        self.center += *translation;
    }

    /// A copy of this sphere moved by `translation`.
    #[inline]
    pub fn translated(mut self, translation: &Vector<Real>) -> Self {
        self.translate(translation);
        self
    }
}
