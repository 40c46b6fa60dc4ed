use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
    if parent_id == child_id {
        return Err("Cannot add node as child of itself".to_string());
    }
    if tree.get_node(parent_id).is_none() {
        return Err(format!("Parent node {} not found or deleted", parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(format!("Child node {} not found or deleted", child_id));
    }

    // A node has at most one parent
    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        ));
    }

    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);

    Ok(())
}

/// Soft remove a node, and its descendants when `recursive`.
/// Otherwise children are orphaned (parent set to None).
pub fn remove_node(tree: &mut Tree, id: NodeId, recursive: bool) {
    if tree.get_node(id).is_none() {
        return;
    }

    if let Some(parent_id) = tree.nodes[id].parent {
        if let Some(parent) = tree.get_node_mut(parent_id) {
            parent.children.retain(|&child| child != id);
        }
    }

    let children = tree.nodes[id].children.clone();
    for child_id in children {
        if recursive {
            // Detach first so the recursive call leaves our list alone
            tree.nodes[child_id].parent = None;
            remove_node(tree, child_id, true);
        } else if let Some(child) = tree.get_node_mut(child_id) {
            child.parent = None;
        }
    }

    let node = &mut tree.nodes[id];
    node.deleted = true;
    node.children.clear();
    node.parent = None;

    if tree.root == Some(id) {
        tree.root = None;
    }
}

/// Collapse a node, removing it and connecting its children to its parent.
/// Edge lengths are summed (parent->node + node->child).
pub fn collapse_node(tree: &mut Tree, id: NodeId) -> Result<(), String> {
    let node = tree.get_node(id).ok_or(format!("Node {} not found", id))?;
    let parent_id = node
        .parent
        .ok_or(format!("Node {} has no parent to splice into", id))?;
    let parent_edge = node.length;
    let children = node.children.clone();

    for &child_id in &children {
        let child = &mut tree.nodes[child_id];
        child.parent = Some(parent_id);
        child.length = match (parent_edge, child.length) {
            (Some(p), Some(c)) => Some(p + c),
            (Some(p), None) => Some(p),
            (None, c) => c,
        };
    }

    // Children take the collapsed node's place among its siblings
    let parent = &mut tree.nodes[parent_id];
    if let Some(pos) = parent.children.iter().position(|&x| x == id) {
        parent.children.splice(pos..pos + 1, children);
    }

    let node = &mut tree.nodes[id];
    node.deleted = true;
    node.children.clear();
    node.parent = None;

    Ok(())
}

/// Reroot the tree at the specified node.
/// Edges on the path from the old root are reversed; each reversed edge keeps
/// its length, now stored on the former parent.
pub fn reroot_at(tree: &mut Tree, new_root_id: NodeId) -> Result<(), String> {
    if tree.get_node(new_root_id).is_none() {
        return Err(format!("Node {} not found", new_root_id));
    }

    let old_root_id = tree.root.ok_or("Tree has no root")?;
    if old_root_id == new_root_id {
        return Ok(());
    }

    let path = tree.get_path_from_root(new_root_id)?;

    // path[i]'s length represents edge (path[i-1] -> path[i])
    let lengths: Vec<Option<f64>> = path.iter().map(|&id| tree.nodes[id].length).collect();

    for i in (1..path.len()).rev() {
        let child_id = path[i];
        let parent_id = path[i - 1];

        tree.nodes[parent_id].children.retain(|&x| x != child_id);
        tree.nodes[child_id].children.push(parent_id);

        let parent = &mut tree.nodes[parent_id];
        parent.parent = Some(child_id);
        parent.length = lengths[i];
    }

    let new_root = &mut tree.nodes[new_root_id];
    new_root.parent = None;
    new_root.length = None;

    tree.root = Some(new_root_id);

    Ok(())
}

/// Gives every unnamed internal node a name `{prefix}{n}`, numbered in level
/// order and skipping names already taken. Returns the number of nodes named.
pub fn name_ancestors(tree: &mut Tree, prefix: &str) -> usize {
    let root = match tree.root {
        Some(r) => r,
        None => return 0,
    };

    let taken = tree.get_name_id();
    let mut serial = 0;
    let mut named = 0;

    for id in tree.levelorder(root) {
        let node = &tree.nodes[id];
        if node.is_leaf() || node.name.as_deref().is_some_and(|n| !n.is_empty()) {
            continue;
        }

        let mut name = format!("{}{}", prefix, serial);
        while taken.contains_key(&name) {
            serial += 1;
            name = format!("{}{}", prefix, serial);
        }
        serial += 1;

        tree.nodes[id].set_name(name);
        named += 1;
    }

    named
}
