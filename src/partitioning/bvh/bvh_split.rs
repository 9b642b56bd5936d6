use super::bvh_bins::{bin_index, BvhBin};
use super::bvh_build::BvhBuilder;
use super::PrimitiveSet;
use crate::bounding_volume::Aabb;
use crate::math::Real;
use core::ops::Range;

/// A split plane orthogonal to `axis`, at the coordinate `position`, with its SAH cost.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct SplitCandidate {
    pub(super) axis: usize,
    pub(super) position: Real,
    pub(super) cost: Real,
}

impl SplitCandidate {
    /// The absence of split. Its infinite cost never beats a node's own cost.
    pub(super) const NONE: Self = Self {
        axis: 0,
        position: 0.0,
        cost: Real::INFINITY,
    };
}

/// Replaces NaN and negative costs by `+∞`.
#[inline]
pub(super) fn sanitize_cost(cost: Real) -> Real {
    if cost.is_nan() || cost < 0.0 {
        Real::INFINITY
    } else {
        cost
    }
}

/// The SAH cost of splitting a node into the `left` and `right` halves.
///
/// A split leaving one side empty is never worth it and costs `+∞`.
#[inline]
pub(super) fn split_cost(left: &BvhBin, right: &BvhBin) -> Real {
    if left.count == 0 || right.count == 0 {
        return Real::INFINITY;
    }

    sanitize_cost(left.sah_cost() + right.sah_cost())
}

impl<S: PrimitiveSet + ?Sized> BvhBuilder<'_, S> {
    /// Finds the cheapest of the `bin_count - 1` bin boundaries of `aabb` along `axis`.
    pub(super) fn determine_best_split_bin(
        &mut self,
        range: Range<usize>,
        aabb: &Aabb,
        axis: usize,
    ) -> SplitCandidate {
        let min = aabb.mins[axis];
        let extent = aabb.maxs[axis] - min;

        if extent <= 0.0 || !extent.is_finite() {
            return SplitCandidate::NONE;
        }

        let bin_size = extent / self.bin_count as Real;
        self.build_bins(range, axis, min, bin_size);
        self.bins.collect(self.bin_count);

        let mut best = SplitCandidate::NONE;

        for i in 0..self.bin_count - 1 {
            let cost = split_cost(self.bins.left(i), self.bins.right(i + 1));

            if cost < best.cost {
                best = SplitCandidate {
                    axis,
                    position: min + (i + 1) as Real * bin_size,
                    cost,
                };
            }
        }

        best
    }

    /// Drops every primitive of `range` into the bin containing its coordinate along `axis`.
    pub(super) fn build_bins(&mut self, range: Range<usize>, axis: usize, min: Real, bin_size: Real) {
        self.bins.reset(self.bin_count);

        for &primitive in &self.primitive_indices[range] {
            let primitive = primitive as usize;
            let coord = self.primitives.coordinate(primitive, axis);
            let bin = bin_index(coord, min, bin_size, self.bin_count);
            self.bins.add_to_bin(bin, &self.primitives.aabb(primitive));
        }
    }

    /// Tries the coordinate of every primitive of `range` along `axis` as split position and
    /// returns the cheapest.
    ///
    /// This is quadratic in the number of primitives so it is only used for small nodes.
    pub(super) fn determine_best_split_full(
        &mut self,
        range: Range<usize>,
        axis: usize,
    ) -> SplitCandidate {
        let mut best = SplitCandidate::NONE;

        for k in range.clone() {
            let position = self
                .primitives
                .coordinate(self.primitive_indices[k] as usize, axis);
            let cost = self.evaluate_sah(range.clone(), axis, position);

            if cost < best.cost {
                best = SplitCandidate {
                    axis,
                    position,
                    cost,
                };
            }
        }

        best
    }

    /// The SAH cost of splitting the primitives of `range` with the plane at `position` on `axis`.
    ///
    /// Primitives with a coordinate strictly smaller than `position` go to the left.
    pub(super) fn evaluate_sah(&mut self, range: Range<usize>, axis: usize, position: Real) -> Real {
        self.bins.reset_accumulators();

        for &primitive in &self.primitive_indices[range] {
            let primitive = primitive as usize;
            let aabb = self.primitives.aabb(primitive);

            if self.primitives.coordinate(primitive, axis) < position {
                self.bins.grow_left(&aabb);
            } else {
                self.bins.grow_right(&aabb);
            }
        }

        split_cost(self.bins.left_accumulator(), self.bins.right_accumulator())
    }
}
