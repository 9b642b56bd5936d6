use super::bvh_bins::BinBuffer;
use super::bvh_split::SplitCandidate;
use super::{Bvh, BvhBuildOptions, BvhNode, BvhWorkspace, PrimitiveSet, MAX_BINS};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use alloc::vec;
use core::ops::Range;

/// The maximum number of primitives a single tree can index.
///
/// This keeps every node index of the `2N - 1` nodes of the arena representable as a `u32`.
pub const MAX_PRIMITIVES: usize = 1 << 31;

/// Indicates an error while building a BVH.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BvhBuildError {
    /// The node arena is too small for the number of primitives.
    #[error("the node arena holds {capacity} nodes but at least {required} are needed")]
    ArenaTooSmall {
        /// The minimum arena length for this primitive count.
        required: usize,
        /// The length of the arena that was provided.
        capacity: usize,
    },
    /// The primitive-index array doesn't have one entry per primitive.
    #[error("expected {expected} primitive indices, found {found}")]
    IndexCountMismatch {
        /// The number of primitives.
        expected: usize,
        /// The length of the primitive-index array.
        found: usize,
    },
    /// The primitive-index array isn't a permutation: this index is out of bounds or repeated.
    #[error("the primitive index {0} is out of bounds or appears more than once")]
    InvalidPermutation(u32),
    /// The bin count is outside of `2..=MAX_BINS`.
    #[error("invalid bin count {0}, expected a value in 2..={max}", max = MAX_BINS)]
    InvalidBinCount(usize),
    /// There are more than [`MAX_PRIMITIVES`] primitives.
    #[error("cannot index {0} primitives, at most {max} are supported", max = MAX_PRIMITIVES)]
    TooManyPrimitives(usize),
}

/// The number of nodes a tree over `primitive_count` primitives may use: `max(2N - 1, 1)`.
///
/// A node arena at least this long never runs out of nodes during a build.
#[inline]
pub fn required_node_capacity(primitive_count: usize) -> usize {
    (2 * primitive_count).saturating_sub(1).max(1)
}

/// Builds a tree into caller-owned arrays and returns the number of nodes used.
///
/// The root is written at `nodes[0]` and every other node is allocated after its parent.
/// `primitive_indices` must be a permutation of `0..primitives.len()`; it is partitioned in
/// place so that each leaf refers to a contiguous slice of it. The primitives themselves are
/// never moved.
///
/// # Panics
///
/// Panics if `nodes` holds fewer than [`required_node_capacity`] nodes, if `primitive_indices`
/// doesn't have one entry per primitive, or if `options` is invalid. A truncated tree would
/// not bound its primitives anymore.
pub fn build_bvh<S: PrimitiveSet + ?Sized>(
    nodes: &mut [BvhNode],
    primitives: &S,
    primitive_indices: &mut [u32],
    workspace: &mut BvhWorkspace,
    options: &BvhBuildOptions,
) -> u32 {
    try_build_bvh(nodes, primitives, primitive_indices, workspace, options)
        .unwrap_or_else(|err| panic!("Invalid BVH build input: {err}."))
}

/// Same as [`build_bvh`], but returns an error instead of panicking when the arrays or the
/// options can't be used for a build.
///
/// Nothing is written if an error is returned. The content of `primitive_indices` isn't checked
/// to be a permutation.
pub fn try_build_bvh<S: PrimitiveSet + ?Sized>(
    nodes: &mut [BvhNode],
    primitives: &S,
    primitive_indices: &mut [u32],
    workspace: &mut BvhWorkspace,
    options: &BvhBuildOptions,
) -> Result<u32, BvhBuildError> {
    options.validate()?;

    let primitive_count = primitives.len();

    if primitive_count > MAX_PRIMITIVES {
        return Err(BvhBuildError::TooManyPrimitives(primitive_count));
    }

    if primitive_indices.len() != primitive_count {
        return Err(BvhBuildError::IndexCountMismatch {
            expected: primitive_count,
            found: primitive_indices.len(),
        });
    }

    let required = required_node_capacity(primitive_count);

    if nodes.len() < required {
        return Err(BvhBuildError::ArenaTooSmall {
            required,
            capacity: nodes.len(),
        });
    }

    let mut builder = BvhBuilder {
        nodes,
        primitives,
        primitive_indices,
        bins: &mut workspace.bins,
        bin_count: options.bin_count,
    };
    Ok(builder.build())
}

/// The union of the AABBs of the primitives listed in `indices`.
///
/// This is the empty (invalid) AABB if `indices` is empty.
#[inline]
pub(super) fn primitives_aabb<S: PrimitiveSet + ?Sized>(primitives: &S, indices: &[u32]) -> Aabb {
    indices.iter().fold(Aabb::new_invalid(), |acc, &i| {
        acc.merged(&primitives.aabb(i as usize))
    })
}

/// The state of a single top-down build.
pub(super) struct BvhBuilder<'a, S: ?Sized> {
    pub(super) nodes: &'a mut [BvhNode],
    pub(super) primitives: &'a S,
    pub(super) primitive_indices: &'a mut [u32],
    pub(super) bins: &'a mut BinBuffer,
    pub(super) bin_count: usize,
}

impl<S: PrimitiveSet + ?Sized> BvhBuilder<'_, S> {
    /// Builds the whole tree and returns the number of nodes used.
    pub(super) fn build(&mut self) -> u32 {
        // With no primitive, this is an empty root with invalid bounds.
        self.nodes[0] = BvhNode::with_primitives(0, self.primitive_indices.len() as u32);
        self.update_bounds(0);
        self.subdivide(0, 1)
    }

    /// Sets the AABB of the node `node_id` to the union of its primitives.
    pub(super) fn update_bounds(&mut self, node_id: u32) {
        let node = &mut self.nodes[node_id as usize];
        let range = node.contents as usize..node.contents as usize + node.count as usize;
        node.set_aabb(primitives_aabb(
            self.primitives,
            &self.primitive_indices[range],
        ));
    }

    /// Splits the leaf `node_id` recursively for as long as the SAH says it is worth it.
    ///
    /// New nodes are allocated from `next_free_node`. Returns the next free node after the
    /// whole sub-tree was built.
    pub(super) fn subdivide(&mut self, node_id: u32, next_free_node: u32) -> u32 {
        let node = self.nodes[node_id as usize];

        let range = match node.primitive_range() {
            Some(range) if range.len() >= 2 => range,
            _ => return next_free_node,
        };

        let aabb = node.aabb();
        let axis = aabb.largest_axis();
        let best = if range.len() >= self.bin_count {
            self.determine_best_split_bin(range, &aabb, axis)
        } else {
            self.determine_best_split_full(range, axis)
        };

        let node_cost = node.count as Real * aabb.half_surface_area();

        if node_cost.is_nan() || best.cost >= node_cost {
            return next_free_node;
        }

        self.object_split(node_id, best, next_free_node)
    }

    /// Partitions the primitives of `node_id` along `split` and builds its two children.
    ///
    /// The node stays a leaf if the partition leaves one side empty.
    pub(super) fn object_split(
        &mut self,
        node_id: u32,
        split: SplitCandidate,
        next_free_node: u32,
    ) -> u32 {
        let node = self.nodes[node_id as usize];
        let first = node.contents;
        let left_count = self.partition(
            first as usize..first as usize + node.count as usize,
            split.axis,
            split.position,
        ) as u32;

        if left_count == 0 || left_count == node.count {
            log::debug!(
                "Degenerate split of node {} at {} on axis {}: all its {} primitives are on the same side.",
                node_id,
                split.position,
                split.axis,
                node.count
            );
            return next_free_node;
        }

        let left = next_free_node;
        let right = next_free_node + 1;
        self.nodes[left as usize] = BvhNode::with_primitives(first, left_count);
        self.nodes[right as usize] =
            BvhNode::with_primitives(first + left_count, node.count - left_count);
        self.nodes[node_id as usize].make_internal(left);

        self.update_bounds(left);
        let next_free_node = self.subdivide(left, next_free_node + 2);
        self.update_bounds(right);
        self.subdivide(right, next_free_node)
    }

    /// Reorders `primitive_indices[range]` so that the primitives with a coordinate smaller than
    /// `position` along `axis` come first. Returns how many there are.
    pub(super) fn partition(&mut self, range: Range<usize>, axis: usize, position: Real) -> usize {
        let mut i = range.start;
        let mut end = range.end;

        while i < end {
            let primitive = self.primitive_indices[i] as usize;

            if self.primitives.coordinate(primitive, axis) < position {
                i += 1;
            } else {
                end -= 1;
                self.primitive_indices.swap(i, end);
            }
        }

        i - range.start
    }
}

impl Bvh {
    /// Builds this tree over `primitives` with the default build options.
    ///
    /// Any previous content of the tree is discarded. Returns the number of nodes used.
    ///
    /// Call this whenever the number of primitives changes. When primitives only moved,
    /// [`Bvh::refit`] is much cheaper.
    pub fn build<S: PrimitiveSet + ?Sized>(
        &mut self,
        primitives: &S,
        workspace: &mut BvhWorkspace,
    ) -> u32 {
        self.build_with_options(primitives, workspace, &BvhBuildOptions::default())
    }

    /// Builds this tree over `primitives` with the given build options.
    ///
    /// # Panics
    ///
    /// Panics if `options` is invalid or if there are more than [`MAX_PRIMITIVES`] primitives.
    pub fn build_with_options<S: PrimitiveSet + ?Sized>(
        &mut self,
        primitives: &S,
        workspace: &mut BvhWorkspace,
        options: &BvhBuildOptions,
    ) -> u32 {
        self.try_build_with_options(primitives, workspace, options)
            .unwrap_or_else(|err| panic!("Invalid BVH build input: {err}."))
    }

    /// Builds this tree over `primitives`, starting from the identity permutation.
    ///
    /// The tree is left unchanged if an error is returned.
    pub fn try_build_with_options<S: PrimitiveSet + ?Sized>(
        &mut self,
        primitives: &S,
        workspace: &mut BvhWorkspace,
        options: &BvhBuildOptions,
    ) -> Result<u32, BvhBuildError> {
        options.validate()?;

        let primitive_count = primitives.len();

        if primitive_count > MAX_PRIMITIVES {
            return Err(BvhBuildError::TooManyPrimitives(primitive_count));
        }

        self.primitive_indices.clear();
        self.primitive_indices.extend(0..primitive_count as u32);
        Ok(self.rebuild(primitives, workspace, options))
    }

    /// Builds this tree over `primitives`, starting from the permutation `indices`.
    ///
    /// The final order of the primitive indices depends on the initial one, so this lets callers
    /// reproduce a previous build exactly. The tree is left unchanged if an error is returned.
    pub fn try_build_with_indices<S: PrimitiveSet + ?Sized>(
        &mut self,
        primitives: &S,
        indices: &[u32],
        workspace: &mut BvhWorkspace,
        options: &BvhBuildOptions,
    ) -> Result<u32, BvhBuildError> {
        options.validate()?;

        let primitive_count = primitives.len();

        if primitive_count > MAX_PRIMITIVES {
            return Err(BvhBuildError::TooManyPrimitives(primitive_count));
        }

        if indices.len() != primitive_count {
            return Err(BvhBuildError::IndexCountMismatch {
                expected: primitive_count,
                found: indices.len(),
            });
        }

        let mut seen = vec![false; primitive_count];

        for &index in indices {
            match seen.get_mut(index as usize) {
                Some(seen) if !*seen => *seen = true,
                _ => return Err(BvhBuildError::InvalidPermutation(index)),
            }
        }

        self.primitive_indices.clear();
        self.primitive_indices.extend_from_slice(indices);
        Ok(self.rebuild(primitives, workspace, options))
    }

    fn rebuild<S: PrimitiveSet + ?Sized>(
        &mut self,
        primitives: &S,
        workspace: &mut BvhWorkspace,
        options: &BvhBuildOptions,
    ) -> u32 {
        self.nodes.clear();
        self.nodes.resize(
            required_node_capacity(self.primitive_indices.len()),
            BvhNode::empty(),
        );

        let mut builder = BvhBuilder {
            nodes: &mut self.nodes,
            primitives,
            primitive_indices: &mut self.primitive_indices,
            bins: &mut workspace.bins,
            bin_count: options.bin_count,
        };
        self.node_count = builder.build();

        log::debug!(
            "Built a BVH over {} primitives: {} nodes, {} leaves, depth {}.",
            self.primitive_indices.len(),
            self.node_count,
            self.leaf_count(),
            self.subtree_depth(0)
        );

        self.node_count
    }
}
