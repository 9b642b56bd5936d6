use super::bvh_build::primitives_aabb;
use super::{Bvh, BvhNode, PrimitiveSet};
use crate::bounding_volume::BoundingVolume;

/// Recomputes the bounds of the first `node_count` nodes of a tree built by
/// [`build_bvh`](super::build_bvh), after its primitives moved.
///
/// The topology is left untouched: leaves keep their primitive ranges and internal nodes keep
/// their children. Nodes are visited from the last one to the root so every child is updated
/// before its parent. This runs in linear time without recursion nor allocation.
///
/// `primitive_indices` and `node_count` must be the ones produced by the last build, and the
/// number of primitives must not have changed since then.
///
/// # Panics
///
/// Panics if `node_count` is larger than the number of nodes in `nodes`.
pub fn refit_bvh<S: PrimitiveSet + ?Sized>(
    nodes: &mut [BvhNode],
    primitives: &S,
    primitive_indices: &[u32],
    node_count: u32,
) {
    assert!(
        node_count as usize <= nodes.len(),
        "Cannot refit {} nodes out of an arena of {} nodes.",
        node_count,
        nodes.len()
    );

    let nodes = &mut nodes[..node_count as usize];

    if primitive_indices.is_empty() {
        // The only node of an empty tree is a root with empty bounds and no children.
        nodes.fill(BvhNode::empty());
        return;
    }

    log::trace!("Refitting {} BVH nodes.", node_count);

    for node_id in (0..nodes.len()).rev() {
        let node = nodes[node_id];
        let aabb = match node.primitive_range() {
            Some(range) => primitives_aabb(primitives, &primitive_indices[range]),
            None => {
                let left = node.contents as usize;
                nodes[left].aabb().merged(&nodes[left + 1].aabb())
            }
        };
        nodes[node_id].set_aabb(aabb);
    }
}

impl Bvh {
    /// Updates the bounds of every node after `primitives` moved.
    ///
    /// The tree topology doesn’t change, so this is much cheaper than a rebuild but the tree
    /// quality degrades as primitives drift away from their initial position. `primitives` must
    /// be the same set, with the same count and indexing, as the one given to the last build.
    ///
    /// Calling this twice without moving any primitive yields bit-identical bounds.
    ///
    /// # Panics
    ///
    /// Panics if the number of primitives changed since the last build.
    pub fn refit<S: PrimitiveSet + ?Sized>(&mut self, primitives: &S) {
        assert_eq!(
            primitives.len(),
            self.primitive_indices.len(),
            "The number of primitives changed since the last build: rebuild the BVH instead."
        );

        refit_bvh(
            &mut self.nodes,
            primitives,
            &self.primitive_indices,
            self.node_count,
        );
    }
}
