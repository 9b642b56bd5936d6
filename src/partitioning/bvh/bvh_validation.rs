use super::bvh_build::primitives_aabb;
use super::{Bvh, PrimitiveSet};
use crate::bounding_volume::BoundingVolume;
use alloc::vec;

impl Bvh {
    /// Panics if this tree isn't a valid BVH over `primitives`.
    ///
    /// This checks that:
    /// - every used node is reachable from the root exactly once,
    /// - children are allocated as adjacent pairs, after their parent,
    /// - leaves are non-empty and together refer to every primitive exactly once,
    /// - every node AABB is exactly the union of its primitives (leaves) or of its children
    ///   (internal nodes).
    ///
    /// This is slow and meant for tests and debugging.
    pub fn assert_well_formed<S: PrimitiveSet + ?Sized>(&self, primitives: &S) {
        let node_count = self.node_count as usize;
        let primitive_count = self.primitive_indices.len();

        assert!(node_count <= self.nodes.len());
        assert_eq!(primitives.len(), primitive_count);

        if primitive_count == 0 {
            if node_count > 0 {
                assert_eq!(node_count, 1, "An empty tree must only have its root.");
                let root = &self.nodes[0];
                assert_eq!(root.count, 0);
                assert!(!root.aabb().is_valid());
            }
            return;
        }

        assert!(node_count >= 1 && node_count < 2 * primitive_count);

        let mut visited_nodes = vec![false; node_count];
        let mut seen_primitives = vec![false; primitive_count];
        let mut stack = vec![0u32];

        while let Some(node_id) = stack.pop() {
            if visited_nodes[node_id as usize] {
                panic!("Detected loop. Node {} visited twice.", node_id);
            }
            visited_nodes[node_id as usize] = true;

            let node = &self.nodes[node_id as usize];

            if let Some(range) = node.primitive_range() {
                assert!(range.end <= primitive_count, "Leaf {} out of range.", node_id);

                for &primitive in &self.primitive_indices[range.clone()] {
                    let seen = &mut seen_primitives[primitive as usize];
                    assert!(!*seen, "Primitive {} referenced twice.", primitive);
                    *seen = true;

                    assert!(node.contains_aabb(&primitives.aabb(primitive as usize)));
                }

                assert_eq!(
                    node.aabb(),
                    primitives_aabb(primitives, &self.primitive_indices[range]),
                    "Leaf {} isn’t tight.",
                    node_id
                );
            } else {
                let left = node.contents;
                let right = left + 1;

                assert!(left > node_id, "Child {} allocated before its parent.", left);
                assert!(
                    (right as usize) < node_count,
                    "Child {} isn’t a used node.",
                    right
                );

                let left_aabb = self.nodes[left as usize].aabb();
                let right_aabb = self.nodes[right as usize].aabb();
                assert!(node.contains_aabb(&left_aabb));
                assert!(node.contains_aabb(&right_aabb));
                assert_eq!(
                    node.aabb(),
                    left_aabb.merged(&right_aabb),
                    "Internal node {} isn’t tight.",
                    node_id
                );

                stack.push(right);
                stack.push(left);
            }
        }

        if let Some(orphan) = visited_nodes.iter().position(|visited| !*visited) {
            panic!("Node {} is unreachable from the root.", orphan);
        }

        if let Some(missing) = seen_primitives.iter().position(|seen| !*seen) {
            panic!("Primitive {} isn’t referenced by any leaf.", missing);
        }
    }

    /// The number of primitives stored in the leaves of the sub-tree rooted at `node_id`.
    pub fn reachable_primitive_count(&self, node_id: u32) -> usize {
        let node = self.node(node_id);

        match node.children() {
            Some([left, right]) if !self.is_empty() => {
                self.reachable_primitive_count(left) + self.reachable_primitive_count(right)
            }
            _ => node.count as usize,
        }
    }
}
