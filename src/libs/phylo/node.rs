/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and stays valid when a tree is cloned.
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Index in the arena
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// Ordered child node IDs
    pub children: Vec<NodeId>,

    /// Genome name, e.g. "human" or "Anc3"
    pub name: Option<String>,

    /// Branch length to parent.
    /// In rooted trees, edge length is an attribute of the child node.
    pub length: Option<f64>,

    /// Soft deletion flag.
    /// Working copies drop whole subtrees without renumbering the arena.
    pub deleted: bool,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            deleted: false,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// A node is a leaf if `children` is empty.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Name or an empty string
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
