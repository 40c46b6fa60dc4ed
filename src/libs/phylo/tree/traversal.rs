use super::Tree;
use crate::libs::phylo::node::NodeId;
use std::collections::VecDeque;

/// Node IDs in preorder (Root -> Children)
pub fn preorder(tree: &Tree, start_node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut stack = vec![start_node];

    while let Some(id) = stack.pop() {
        if let Some(node) = tree.get_node(id) {
            result.push(id);
            // Reverse so children come out in order
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }

    result
}

/// Node IDs in postorder (Children -> Root)
pub fn postorder(tree: &Tree, start_node: NodeId) -> Vec<NodeId> {
    fn helper(tree: &Tree, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(node) = tree.get_node(id) {
            for &child in &node.children {
                helper(tree, child, result);
            }
            result.push(id);
        }
    }

    let mut result = Vec::new();
    helper(tree, start_node, &mut result);
    result
}

/// Node IDs in levelorder (BFS)
pub fn levelorder(tree: &Tree, start_node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(start_node);

    while let Some(id) = queue.pop_front() {
        if let Some(node) = tree.get_node(id) {
            result.push(id);
            queue.extend(node.children.iter().copied());
        }
    }

    result
}
