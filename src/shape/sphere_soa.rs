use crate::math::{Point, Real, Vector};
use crate::shape::Sphere;
use alloc::vec::Vec;

/// A set of spheres stored as a struct of arrays.
///
/// Each sphere attribute lives in its own column, which is the layout expected by
/// shaders reading scalar storage buffers. The sphere at index `i` is made of
/// `xs[i]`, `ys[i]`, `zs[i]` and `radii[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SphereSoa {
    xs: Vec<Real>,
    ys: Vec<Real>,
    zs: Vec<Real>,
    radii: Vec<Real>,
}

impl SphereSoa {
    /// An empty set of spheres.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set of spheres with room for `capacity` elements in each column.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            zs: Vec::with_capacity(capacity),
            radii: Vec::with_capacity(capacity),
        }
    }

    /// Appends a sphere. Its index is the number of spheres stored before this call.
    pub fn push(&mut self, sphere: Sphere) {
        self.xs.push(sphere.center.x);
        self.ys.push(sphere.center.y);
        self.zs.push(sphere.center.z);
        self.radii.push(sphere.radius);
    }

    /// The number of spheres.
    #[inline]
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// Is this set empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// The center of the `i`-th sphere.
    #[inline]
    pub fn center(&self, i: usize) -> Point<Real> {
        Point::new(self.xs[i], self.ys[i], self.zs[i])
    }

    /// The radius of the `i`-th sphere.
    #[inline]
    pub fn radius(&self, i: usize) -> Real {
        self.radii[i]
    }

    /// The `i`-th sphere.
    #[inline]
    pub fn get(&self, i: usize) -> Sphere {
        Sphere::new(self.center(i), self.radius(i))
    }

    /// Moves the center of the `i`-th sphere to `center`.
    #[inline]
    pub fn set_center(&mut self, i: usize, center: Point<Real>) {
        self.xs[i] = center.x;
        self.ys[i] = center.y;
        self.zs[i] = center.z;
    }

    /// Moves the center of the `i`-th sphere by `translation`.
    #[inline]
    pub fn translate(&mut self, i: usize, translation: &Vector<Real>) {
        let center = self.center(i) + *translation;
        self.set_center(i, center);
    }

    /// Iterates through all the spheres of this set, in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Sphere> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

impl FromIterator<Sphere> for SphereSoa {
    fn from_iter<I: IntoIterator<Item = Sphere>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut result = Self::with_capacity(iter.size_hint().0);
        for sphere in iter {
            result.push(sphere);
        }
        result
    }
}

impl Extend<Sphere> for SphereSoa {
    fn extend<I: IntoIterator<Item = Sphere>>(&mut self, iter: I) {
        for sphere in iter {
            self.push(sphere);
        }
    }
}
