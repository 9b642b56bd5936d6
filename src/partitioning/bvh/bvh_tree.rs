use super::bvh_bins::BinBuffer;
use super::{BvhBuildError, PrimitiveSet, MAX_BINS};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use alloc::vec::Vec;
use core::ops::Range;

/// The default number of bins used by the binned SAH split evaluation.
pub const DEFAULT_BIN_COUNT: usize = 16;

/// Parameters of a BVH build.
///
/// Nodes holding at least `bin_count` primitives pick their split position with the binned
/// surface area heuristic. Smaller nodes evaluate every primitive position instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BvhBuildOptions {
    /// Number of bins used by the binned split evaluation, in `2..=MAX_BINS`.
    pub bin_count: usize,
}

impl Default for BvhBuildOptions {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
        }
    }
}

impl BvhBuildOptions {
    /// Build options with the given bin count.
    pub fn with_bin_count(bin_count: usize) -> Self {
        Self { bin_count }
    }

    /// Checks that these options can be used for a build.
    pub fn validate(&self) -> Result<(), BvhBuildError> {
        if self.bin_count < 2 || self.bin_count > MAX_BINS {
            Err(BvhBuildError::InvalidBinCount(self.bin_count))
        } else {
            Ok(())
        }
    }
}

/// Workspace data for building a tree.
///
/// This holds the bin buffer used while evaluating split candidates. It is all temporary data
/// that can be dropped at any time without affecting results. The main reason to reuse the same
/// instance of this over time is to avoid re-initializing it for every build.
///
/// A workspace must not be shared by two builds running at the same time; give each thread
/// its own.
#[derive(Clone, Debug, Default)]
pub struct BvhWorkspace {
    pub(super) bins: BinBuffer,
}

/// A node (internal or leaf) of a BVH.
///
/// - A leaf has `count > 0` and `contents` is the offset of its first entry in the
///   primitive-index array. Its primitives are the `count` consecutive entries starting there.
/// - An internal node has `count == 0` and `contents` is the index of its left child. The right
///   child is always stored right after it, at `contents + 1`.
///
/// The layout is `#[repr(C)]` so the node array can be copied as-is into a GPU buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct BvhNode {
    /// Mins coordinates of the node’s bounding volume.
    pub(super) mins: Point<Real>,
    /// Maxs coordinates of the node’s bounding volume.
    pub(super) maxs: Point<Real>,
    /// Number of primitives of this node if it is a leaf, 0 otherwise.
    pub(super) count: u32,
    /// First primitive-index entry (leaf) or left child index (internal node).
    pub(super) contents: u32,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl BvhNode {
    /// A node with empty (invalid) bounds and zero count.
    ///
    /// This is the value used for pre-allocating node arenas.
    #[inline]
    pub fn empty() -> Self {
        let aabb = Aabb::new_invalid();
        Self {
            mins: aabb.mins,
            maxs: aabb.maxs,
            count: 0,
            contents: 0,
        }
    }

    /// A leaf over `count` primitive-index entries starting at `first`, with empty bounds.
    #[inline]
    pub(super) fn with_primitives(first: u32, count: u32) -> Self {
        Self {
            count,
            contents: first,
            ..Self::empty()
        }
    }

    /// Is this node a leaf?
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }

    /// The number of primitives of this node if it is a leaf, and 0 if it is an internal node.
    #[inline(always)]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The raw `contents` field: first primitive-index entry of a leaf, or left child index of
    /// an internal node.
    #[inline(always)]
    pub fn contents(&self) -> u32 {
        self.contents
    }

    /// The indices of the two children of this node, or `None` if it is a leaf.
    #[inline]
    pub fn children(&self) -> Option<[u32; 2]> {
        (!self.is_leaf()).then_some([self.contents, self.contents + 1])
    }

    /// The range of primitive-index entries of this node, or `None` if it isn’t a leaf.
    #[inline]
    pub fn primitive_range(&self) -> Option<Range<usize>> {
        self.is_leaf()
            .then(|| self.contents as usize..self.contents as usize + self.count as usize)
    }

    /// The min corner of this node’s AABB.
    #[inline]
    pub fn mins(&self) -> Point<Real> {
        self.mins
    }

    /// The max corner of this node’s AABB.
    #[inline]
    pub fn maxs(&self) -> Point<Real> {
        self.maxs
    }

    /// This node’s AABB.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb {
            mins: self.mins,
            maxs: self.maxs,
        }
    }

    #[inline]
    pub(super) fn set_aabb(&mut self, aabb: Aabb) {
        self.mins = aabb.mins;
        self.maxs = aabb.maxs;
    }

    #[inline]
    pub(super) fn make_internal(&mut self, left_child: u32) {
        self.count = 0;
        self.contents = left_child;
    }

    /// The center of this node’s AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// Checks if the AABB of `self` fully encloses the `other` AABB.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }
}

/// A Bounding Volume Hierarchy over a set of primitives, built with the surface area heuristic.
///
/// The tree owns its node arena and its primitive-index array, but never the primitives
/// themselves: they are borrowed by [`Bvh::build`] and [`Bvh::refit`] and are never reordered.
/// Leaves refer to primitives through [`Bvh::primitive_indices`].
///
/// Build once whenever the primitive count changes, then [refit](Bvh::refit) every frame after
/// primitives moved.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    pub(super) nodes: Vec<BvhNode>,
    pub(super) primitive_indices: Vec<u32>,
    pub(super) node_count: u32,
}

impl Bvh {
    /// An empty BVH.
    ///
    /// Nothing is indexed until [`Bvh::build`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a new BVH over `primitives` with the default build options.
    pub fn from_primitives<S: PrimitiveSet + ?Sized>(primitives: &S) -> Self {
        let mut result = Self::new();
        let _ = result.build(primitives, &mut BvhWorkspace::default());
        result
    }

    /// The nodes used by this tree. The root, if any, is at index 0.
    #[inline]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes[..self.node_count as usize]
    }

    /// The node at index `node_id`.
    ///
    /// Panics if `node_id` isn’t smaller than [`Bvh::node_count`].
    #[inline]
    pub fn node(&self, node_id: u32) -> &BvhNode {
        &self.nodes()[node_id as usize]
    }

    /// The permutation of primitive indices the leaves refer to.
    #[inline]
    pub fn primitive_indices(&self) -> &[u32] {
        &self.primitive_indices
    }

    /// The number of nodes used by this tree.
    #[inline]
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// The number of primitives indexed by this tree.
    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitive_indices.len()
    }

    /// Does this tree not contain any primitive?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primitive_indices.is_empty()
    }

    /// The root of this tree, if it was built.
    #[inline]
    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes().first()
    }

    /// The AABB bounding everything contained by this BVH.
    ///
    /// This is an invalid AABB if the tree is empty.
    pub fn root_aabb(&self) -> Aabb {
        self.root()
            .map(BvhNode::aabb)
            .unwrap_or_else(Aabb::new_invalid)
    }

    /// The indices of the primitives stored in the node `node_id`.
    ///
    /// This is empty if `node_id` is an internal node.
    pub fn leaf_primitives(&self, node_id: u32) -> &[u32] {
        match self.node(node_id).primitive_range() {
            Some(range) => &self.primitive_indices[range],
            None => &[],
        }
    }

    /// Iterates through all the leaves of this tree, with their node index.
    pub fn leaves(&self) -> impl Iterator<Item = (u32, &BvhNode)> + '_ {
        self.nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, node)| (id as u32, node))
    }

    /// The number of leaves of this tree.
    pub fn leaf_count(&self) -> u32 {
        self.leaves().count() as u32
    }

    /// The depth of the sub-tree rooted at the node with index `node_id`.
    ///
    /// Set `node_id` to 0 to get the depth of the whole tree.
    pub fn subtree_depth(&self, node_id: u32) -> u32 {
        if self.is_empty() {
            return (node_id < self.node_count) as u32;
        }

        match self.node(node_id).children() {
            None => 1,
            Some([left, right]) => self.subtree_depth(left).max(self.subtree_depth(right)) + 1,
        }
    }

    /// An approximation of the memory usage (in bytes) for this struct plus
    /// the memory it allocates dynamically.
    pub fn total_memory_size(&self) -> usize {
        core::mem::size_of::<Self>() + self.heap_memory_size()
    }

    /// An approximation of the memory dynamically-allocated by this struct.
    pub fn heap_memory_size(&self) -> usize {
        let Self {
            nodes,
            primitive_indices,
            node_count: _,
        } = self;
        nodes.capacity() * core::mem::size_of::<BvhNode>()
            + primitive_indices.capacity() * core::mem::size_of::<u32>()
    }
}
