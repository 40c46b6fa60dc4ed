pub mod io;
pub mod ops;
pub mod query;
pub mod traversal;

use super::node::{Node, NodeId};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new detached node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id));
        id
    }

    /// Number of live (not soft-deleted) nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID. Deleted nodes are invisible.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// IDs of all live nodes, ascending
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| !n.deleted)
            .map(|n| n.id)
            .collect()
    }

    /// Name of a live node, empty when unnamed or missing
    pub fn name_of(&self, id: NodeId) -> &str {
        self.get_node(id).map(|n| n.label()).unwrap_or("")
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get_node(id).map(|n| n.is_leaf()).unwrap_or(false)
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn remove_node(&mut self, id: NodeId, recursive: bool) {
        ops::remove_node(self, id, recursive)
    }

    pub fn collapse_node(&mut self, id: NodeId) -> Result<(), String> {
        ops::collapse_node(self, id)
    }

    pub fn reroot_at(&mut self, new_root_id: NodeId) -> Result<(), String> {
        ops::reroot_at(self, new_root_id)
    }

    pub fn name_ancestors(&mut self, prefix: &str) -> usize {
        ops::name_ancestors(self, prefix)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: NodeId) -> Vec<NodeId> {
        traversal::preorder(self, start_node)
    }

    pub fn postorder(&self, start_node: NodeId) -> Vec<NodeId> {
        traversal::postorder(self, start_node)
    }

    pub fn levelorder(&self, start_node: NodeId) -> Vec<NodeId> {
        traversal::levelorder(self, start_node)
    }

    // --- Delegation to query ---

    pub fn get_path_from_root(&self, id: NodeId) -> Result<Vec<NodeId>, String> {
        query::get_path_from_root(self, id)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        query::is_ancestor(self, ancestor, id)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    pub fn get_name_id(&self) -> BTreeMap<String, NodeId> {
        query::get_name_id(self)
    }

    pub fn get_leaves(&self, id: NodeId) -> Vec<NodeId> {
        query::get_leaves(self, id)
    }

    // --- Delegation to io ---

    pub fn from_file(infile: &str) -> anyhow::Result<Vec<Tree>> {
        io::from_file(infile)
    }

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }
}
