use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;

/// The maximum number of bins the binned split evaluation can use.
pub const MAX_BINS: usize = 16;

// Slot layout of the bin buffer:
// [bins | left prefixes | right suffixes | left accumulator | right accumulator]
const PREFIX_START: usize = MAX_BINS;
const SUFFIX_START: usize = 2 * MAX_BINS;
const LEFT_ACCUMULATOR: usize = 3 * MAX_BINS;
const RIGHT_ACCUMULATOR: usize = 3 * MAX_BINS + 1;
pub(super) const BIN_BUFFER_LEN: usize = 3 * MAX_BINS + 2;

/// A partial bounding box with the number of primitives merged into it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct BvhBin {
    pub(super) aabb: Aabb,
    pub(super) count: u32,
}

impl Default for BvhBin {
    fn default() -> Self {
        Self::empty()
    }
}

impl BvhBin {
    #[inline]
    pub(super) fn empty() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            count: 0,
        }
    }

    #[inline]
    pub(super) fn add(&mut self, aabb: &Aabb) {
        self.aabb.merge(aabb);
        self.count += 1;
    }

    #[inline]
    pub(super) fn merge(&mut self, other: &Self) {
        self.aabb.merge(&other.aabb);
        self.count += other.count;
    }

    /// The SAH cost of this bin taken as a tree node: `count × half_surface_area`.
    ///
    /// This is NaN for an empty bin.
    #[inline]
    pub(super) fn sah_cost(&self) -> Real {
        self.count as Real * self.aabb.half_surface_area()
    }
}

/// Scratch storage for the split evaluation of a single node.
///
/// Holds the bins, their left-to-right prefix unions, their right-to-left suffix unions, and
/// two running accumulators. All slots are reset before being read so the same buffer can be
/// reused by every node of every build.
#[derive(Clone, Debug)]
pub(super) struct BinBuffer {
    slots: [BvhBin; BIN_BUFFER_LEN],
}

impl Default for BinBuffer {
    fn default() -> Self {
        Self {
            slots: [BvhBin::empty(); BIN_BUFFER_LEN],
        }
    }
}

impl BinBuffer {
    /// Resets the first `bin_count` bins, their prefixes and suffixes, and both accumulators.
    pub(super) fn reset(&mut self, bin_count: usize) {
        assert!(bin_count <= MAX_BINS, "Too many bins: {}.", bin_count);
        for start in [0, PREFIX_START, SUFFIX_START] {
            self.slots[start..start + bin_count].fill(BvhBin::empty());
        }
        self.reset_accumulators();
    }

    #[inline]
    pub(super) fn reset_accumulators(&mut self) {
        self.slots[LEFT_ACCUMULATOR] = BvhBin::empty();
        self.slots[RIGHT_ACCUMULATOR] = BvhBin::empty();
    }

    #[inline]
    pub(super) fn add_to_bin(&mut self, bin: usize, aabb: &Aabb) {
        self.slots[bin].add(aabb);
    }

    #[inline]
    pub(super) fn grow_left(&mut self, aabb: &Aabb) {
        self.slots[LEFT_ACCUMULATOR].add(aabb);
    }

    #[inline]
    pub(super) fn grow_right(&mut self, aabb: &Aabb) {
        self.slots[RIGHT_ACCUMULATOR].add(aabb);
    }

    #[inline]
    pub(super) fn left_accumulator(&self) -> &BvhBin {
        &self.slots[LEFT_ACCUMULATOR]
    }

    #[inline]
    pub(super) fn right_accumulator(&self) -> &BvhBin {
        &self.slots[RIGHT_ACCUMULATOR]
    }

    /// The `i`-th bin.
    #[cfg(test)]
    pub(super) fn bin(&self, i: usize) -> &BvhBin {
        &self.slots[i]
    }

    /// The union of the bins `0..=i`, valid after [`Self::collect`].
    #[inline]
    pub(super) fn left(&self, i: usize) -> &BvhBin {
        &self.slots[PREFIX_START + i]
    }

    /// The union of the bins `i..bin_count`, valid after [`Self::collect`].
    #[inline]
    pub(super) fn right(&self, i: usize) -> &BvhBin {
        &self.slots[SUFFIX_START + i]
    }

    /// Sweeps the bins once in each direction to fill the prefix and suffix unions.
    ///
    /// The accumulators are left holding the union of all the bins.
    pub(super) fn collect(&mut self, bin_count: usize) {
        self.reset_accumulators();

        for i in 0..bin_count {
            let bin = self.slots[i];
            self.slots[LEFT_ACCUMULATOR].merge(&bin);
            self.slots[PREFIX_START + i] = self.slots[LEFT_ACCUMULATOR];

            let j = bin_count - 1 - i;
            let bin = self.slots[j];
            self.slots[RIGHT_ACCUMULATOR].merge(&bin);
            self.slots[SUFFIX_START + j] = self.slots[RIGHT_ACCUMULATOR];
        }
    }
}

/// The index of the bin containing the coordinate `coord`.
///
/// Bins are `bin_size` wide and start at `min`. Coordinates outside of the binned range are
/// clamped to the first or last bin.
#[inline]
pub(super) fn bin_index(coord: Real, min: Real, bin_size: Real, bin_count: usize) -> usize {
    // The cast saturates negative and NaN values to 0.
    (((coord - min) / bin_size) as usize).min(bin_count - 1)
}
