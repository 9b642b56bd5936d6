//! Axis Aligned Bounding Box.

use crate::bounding_volume::BoundingVolume;
use crate::math::{Point, Real, Vector, DIM};

/// An Axis-Aligned Bounding Box (AABB).
///
/// An AABB is defined by its minimum and maximum corners. Every node of the
/// [`Bvh`](crate::partitioning::Bvh) stores one, and every primitive indexed by the tree
/// exposes one.
///
/// # Invariant
///
/// A valid AABB has `mins.x ≤ maxs.x`, `mins.y ≤ maxs.y` and `mins.z ≤ maxs.z`. The
/// [`Aabb::new_invalid`] box breaks this on purpose: it is the identity element of
/// [`BoundingVolume::merge`].
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use sahbvh3d::bounding_volume::Aabb;
/// use nalgebra::{Point3, Vector3};
///
/// let aabb = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
///
/// assert_eq!(aabb.center(), Point3::origin());
/// assert_eq!(aabb.extents(), Vector3::new(2.0, 4.0, 6.0));
/// // dx·dy + dy·dz + dx·dz
/// assert_eq!(aabb.half_surface_area(), 8.0 + 24.0 + 12.0);
/// # }
/// ```
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with inverted, infinite bounds.
    ///
    /// `mins` is set to `+∞` and `maxs` to `−∞` so that merging any box into it yields that
    /// box exactly. This is the "empty" sentinel used by the tree builder and the refitter.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::INFINITY).into(),
            Vector::repeat(Real::NEG_INFINITY).into(),
        )
    }

    /// Creates a new AABB from its center and half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half-extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Half the surface area of this AABB: `dx·dy + dy·dz + dx·dz`.
    ///
    /// This is the area term of the surface area heuristic. Using half the area everywhere
    /// doesn't change which split is the cheapest.
    ///
    /// The result is `+∞` for [`Aabb::new_invalid`].
    #[inline]
    pub fn half_surface_area(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y + extents.y * extents.z + extents.x * extents.z
    }

    /// The index of the axis along which this AABB is the largest.
    ///
    /// Ties are resolved toward the lowest axis index (x before y before z).
    #[inline]
    pub fn largest_axis(&self) -> usize {
        let extents = self.extents();
        let mut axis = 0;

        for i in 1..DIM {
            if extents[i] > extents[axis] {
                axis = i;
            }
        }

        axis
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.inf(&pt);
        self.maxs = self.maxs.sup(&pt);
    }

    /// Does this AABB have `mins <= maxs` on every axis?
    ///
    /// This is `false` for the AABB returned by [`Aabb::new_invalid`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        na::partial_le(&self.mins, &self.maxs)
    }

    /// Tests if the given point is inside of this AABB (boundary included).
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        na::partial_le(&self.mins, point) && na::partial_ge(&self.maxs, point)
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        self.center()
    }

    #[inline]
    fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    #[inline]
    fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    #[inline]
    fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    #[inline]
    fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    #[inline]
    fn loosen(&mut self, amount: Real) {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        self.mins += Vector::repeat(-amount);
        self.maxs += Vector::repeat(amount);
    }

    #[inline]
    fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }
}
