use crate::bounding_volume::{details::sphere_aabb, Aabb};
use crate::math::{Point, Real};
use crate::shape::{Sphere, SphereSoa};
use alloc::vec::Vec;

/// A primitive that can be indexed by a [`Bvh`](crate::partitioning::Bvh).
///
/// The tree only needs two things from a primitive: the AABB it must enclose, and a
/// representative point whose coordinates decide on which side of a split plane the primitive
/// goes.
pub trait Bounded {
    /// The world-space AABB of this primitive.
    fn aabb(&self) -> Aabb;

    /// The point used to sort this primitive along a split axis.
    ///
    /// Defaults to the center of [`Bounded::aabb`].
    fn centroid(&self) -> Point<Real> {
        self.aabb().center()
    }
}

impl Bounded for Sphere {
    #[inline]
    fn aabb(&self) -> Aabb {
        Sphere::aabb(self)
    }

    #[inline]
    fn centroid(&self) -> Point<Real> {
        self.center
    }
}

impl Bounded for Aabb {
    #[inline]
    fn aabb(&self) -> Aabb {
        *self
    }
}

/// An indexable collection of primitives.
///
/// This abstracts the memory layout of the primitive store: the builder and the refitter only
/// access primitives through their index, so an array of structs and a struct of arrays are
/// handled by the same code.
///
/// Indices must be stable: the tree refers to primitives by their index in this set.
pub trait PrimitiveSet {
    /// The number of primitives.
    fn len(&self) -> usize;

    /// Is this set empty?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The AABB of the `i`-th primitive.
    fn aabb(&self, i: usize) -> Aabb;

    /// The centroid of the `i`-th primitive.
    fn centroid(&self, i: usize) -> Point<Real>;

    /// The coordinate of the centroid of the `i`-th primitive along `axis`.
    #[inline]
    fn coordinate(&self, i: usize, axis: usize) -> Real {
        self.centroid(i)[axis]
    }
}

impl<P: Bounded> PrimitiveSet for [P] {
    #[inline]
    fn len(&self) -> usize {
        <[P]>::len(self)
    }

    #[inline]
    fn aabb(&self, i: usize) -> Aabb {
        self[i].aabb()
    }

    #[inline]
    fn centroid(&self, i: usize) -> Point<Real> {
        self[i].centroid()
    }
}

impl<P: Bounded> PrimitiveSet for Vec<P> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn aabb(&self, i: usize) -> Aabb {
        self[i].aabb()
    }

    #[inline]
    fn centroid(&self, i: usize) -> Point<Real> {
        self[i].centroid()
    }
}

impl PrimitiveSet for SphereSoa {
    #[inline]
    fn len(&self) -> usize {
        SphereSoa::len(self)
    }

    #[inline]
    fn aabb(&self, i: usize) -> Aabb {
        sphere_aabb(&self.center(i), self.radius(i))
    }

    #[inline]
    fn centroid(&self, i: usize) -> Point<Real> {
        self.center(i)
    }
}
