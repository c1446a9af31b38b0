//! Transform system.
//!
//! Hierarchical world-matrix updates, decoupled from `Scene` so the update
//! only borrows the node storage and the root list.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for the whole hierarchy.
///
/// Iterative (explicit stack) to avoid stack overflow on deep hierarchies.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // Work stack: (node handle, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        // 1. Refresh the local matrix
        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        // 2. Refresh the world matrix
        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        // 3. Push children (reverse order preserves traversal order)
        let current_world = node.transform.world_matrix;
        let children_count = node.children.len();

        for i in (0..children_count).rev() {
            if let Some(node) = nodes.get(node_handle)
                && let Some(&child_handle) = node.children.get(i)
            {
                stack.push((child_handle, current_world, world_needs_update));
            }
        }
    }
}

/// Updates the subtree rooted at `root_handle`, seeding from the parent's
/// current world matrix. Used for localized updates after re-parenting.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root_handle: NodeHandle) {
    let parent_world = if let Some(node) = nodes.get(root_handle) {
        if let Some(parent_handle) = node.parent {
            nodes
                .get(parent_handle)
                .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix)
        } else {
            Affine3A::IDENTITY
        }
    } else {
        return;
    };

    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = vec![(root_handle, parent_world, true)];

    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        let current_world = node.transform.world_matrix;
        let children_count = node.children.len();

        for i in (0..children_count).rev() {
            if let Some(node) = nodes.get(node_handle)
                && let Some(&child_handle) = node.children.get(i)
            {
                stack.push((child_handle, current_world, world_needs_update));
            }
        }
    }
}
