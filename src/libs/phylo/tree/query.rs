use super::Tree;
use crate::libs::phylo::node::NodeId;
use std::collections::BTreeMap;

/// Nodes from the root down to `id`, both included.
pub fn get_path_from_root(tree: &Tree, id: NodeId) -> Result<Vec<NodeId>, String> {
    if tree.get_node(id).is_none() {
        return Err(format!("Node {} not found", id));
    }

    let mut path = vec![id];
    let mut current = id;
    while let Some(p) = tree.nodes[current].parent {
        path.push(p);
        current = p;
    }
    path.reverse();

    if tree.root != Some(path[0]) {
        return Err(format!("Node {} is detached from root", id));
    }

    Ok(path)
}

/// True when `ancestor` lies on the path from `id` up to the root.
/// A node is its own ancestor.
pub fn is_ancestor(tree: &Tree, ancestor: NodeId, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(c) = current {
        if c == ancestor {
            return true;
        }
        current = tree.get_node(c).and_then(|n| n.parent);
    }
    false
}

/// IDs of all leaves in the subtree rooted at `id`; a leaf yields itself.
pub fn get_leaves(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let mut leaves = Vec::new();
    let mut stack = vec![id];

    while let Some(curr) = stack.pop() {
        if let Some(node) = tree.get_node(curr) {
            if node.children.is_empty() {
                leaves.push(curr);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
    leaves
}

/// Node ID by name. Returns the first match.
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.nodes
        .iter()
        .find(|n| !n.deleted && n.name.as_deref() == Some(name))
        .map(|n| n.id)
}

/// Named nodes. On duplicated names the last one wins.
pub fn get_name_id(tree: &Tree) -> BTreeMap<String, NodeId> {
    tree.nodes
        .iter()
        .filter(|n| !n.deleted)
        .filter_map(|n| n.name.as_ref().map(|name| (name.clone(), n.id)))
        .collect()
}
