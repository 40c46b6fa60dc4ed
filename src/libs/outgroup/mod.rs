//! Outgroup assignment for the ancestors of a rooted phylogeny.
//!
//! An [`OutgroupContext`] owns everything one assignment request works on:
//! a private copy of the tree, the augmented graph (tree edges plus outgroup
//! edges), the distance tables and the resulting [`OutgroupMap`]. Strategies
//! ([`Greedy`], [`Dynamic`]) only add to a context, so running a strategy
//! twice, or one after the other, extends earlier assignments.
//!
//! ```
//! use ogsel::libs::outgroup::{Greedy, OutgroupContext, OutgroupStrategy};
//! use ogsel::libs::phylo::Tree;
//!
//! let tree = Tree::from_newick("((A:1,B:1)X:1,C:1)root;").unwrap();
//! let mut ctx = OutgroupContext::import_tree(&tree, None).unwrap();
//! Greedy::default().assign(&mut ctx).unwrap();
//!
//! assert_eq!(ctx.outgroups()["X"], vec![("C".to_string(), 2.0)]);
//! ```

pub mod candidate;
pub mod conservation;
pub mod dag;
pub mod distance;
pub mod dynamic;
pub mod error;
pub mod greedy;
pub mod seqstat;

pub use candidate::CandidateFilter;
pub use conservation::{branch_conservation, DEFAULT_BRANCH_LENGTH};
pub use dag::{EdgeKind, OutgroupDag};
pub use distance::DistanceTables;
pub use dynamic::{DpEntry, Dynamic};
pub use error::OutgroupError;
pub use greedy::Greedy;
pub use seqstat::{SeqStat, SeqStatTable};

use crate::libs::phylo::{NodeId, Tree};
use std::collections::{BTreeMap, BTreeSet};

/// Ancestor name -> `(outgroup name, distance)`, closest first
pub type OutgroupMap = BTreeMap<String, Vec<(String, f64)>>;

/// A way of choosing outgroups for the ancestors of `ctx`'s tree.
pub trait OutgroupStrategy {
    /// Adds outgroups to `ctx`. Existing assignments are kept.
    fn assign(&self, ctx: &mut OutgroupContext) -> Result<(), OutgroupError>;
}

#[derive(Debug, Clone)]
pub struct OutgroupContext {
    pub(crate) tree: Tree,
    pub(crate) root: NodeId,
    pub(crate) dag: OutgroupDag,
    pub(crate) dist: DistanceTables,
    pub(crate) og_map: OutgroupMap,
}

impl OutgroupContext {
    /// Validates `tree`, strips the nodes that are not subtree roots and
    /// builds the distance tables and the augmented graph.
    ///
    /// `subtree_roots`: names of the nodes that are alignment events.
    /// `None` keeps every node.
    pub fn import_tree(
        tree: &Tree,
        subtree_roots: Option<&BTreeSet<String>>,
    ) -> Result<Self, OutgroupError> {
        let root = validate(tree)?;

        let mut tree = tree.clone();
        if let Some(events) = subtree_roots {
            strip_non_events(&mut tree, root, events)?;
        }

        let dist = DistanceTables::build(&tree, root);
        let dag = OutgroupDag::from_tree(&tree, root);
        log::info!(
            "Imported tree with {} nodes, {} leaves",
            tree.len(),
            tree.get_leaves(root).len()
        );

        Ok(Self {
            tree,
            root,
            dag,
            dist,
            og_map: OutgroupMap::new(),
        })
    }

    /// The working tree, after stripping
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn dag(&self) -> &OutgroupDag {
        &self.dag
    }

    pub fn distances(&self) -> &DistanceTables {
        &self.dist
    }

    pub fn outgroups(&self) -> &OutgroupMap {
        &self.og_map
    }

    pub fn into_outgroups(self) -> OutgroupMap {
        self.og_map
    }

    /// Drops every outgroup edge and assignment.
    pub fn clear_assignments(&mut self) {
        self.og_map.clear();
        self.dag.clear_outgroups();
    }

    /// Re-imports assignments produced by an earlier request on the same
    /// tree, so that a strategy can extend them.
    pub fn restore(&mut self, map: &OutgroupMap) -> Result<(), OutgroupError> {
        let id_of = self.tree.get_name_id();
        let lookup = |name: &str| {
            id_of
                .get(name)
                .copied()
                .ok_or_else(|| OutgroupError::InvalidAssignment(format!("unknown node {}", name)))
        };

        for (ancestor, outgroups) in map {
            let source = lookup(ancestor)?;
            for (outgroup, dist) in outgroups {
                let sink = lookup(outgroup)?;
                if self.tree.is_ancestor(source, sink) || self.tree.is_ancestor(sink, source) {
                    return Err(OutgroupError::InvalidAssignment(format!(
                        "{} and {} are on the same root path",
                        ancestor, outgroup
                    )));
                }
                if !self.dag.try_add_outgroup(source, sink, *dist) {
                    return Err(OutgroupError::InvalidAssignment(format!(
                        "{} -> {} creates a cycle",
                        ancestor, outgroup
                    )));
                }
                self.push_outgroup(ancestor, outgroup, *dist)?;
            }
        }
        self.sort_outgroups();

        Ok(())
    }

    /// Appends an assignment unless it is already present. A present one
    /// must carry the same distance.
    pub(crate) fn push_outgroup(
        &mut self,
        ancestor: &str,
        outgroup: &str,
        dist: f64,
    ) -> Result<bool, OutgroupError> {
        let list = self.og_map.entry(ancestor.to_string()).or_default();
        if let Some((_, stored)) = list.iter().find(|(name, _)| name == outgroup) {
            if (stored - dist).abs() > 1e-9 {
                return Err(OutgroupError::InconsistentDistance {
                    ancestor: ancestor.to_string(),
                    outgroup: outgroup.to_string(),
                    stored: *stored,
                    computed: dist,
                });
            }
            return Ok(false);
        }
        list.push((outgroup.to_string(), dist));
        Ok(true)
    }

    pub(crate) fn num_outgroups(&self, ancestor: &str) -> usize {
        self.og_map.get(ancestor).map(|v| v.len()).unwrap_or(0)
    }

    /// Closest first. The sort is stable, equal distances keep their order.
    pub(crate) fn sort_outgroups(&mut self) {
        for outgroups in self.og_map.values_mut() {
            outgroups.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
    }
}

/// Checks the tree is one connected, uniquely named component. Returns the root.
fn validate(tree: &Tree) -> Result<NodeId, OutgroupError> {
    let root = tree
        .get_root()
        .ok_or_else(|| OutgroupError::InvalidTree("the tree has no root".to_string()))?;

    let mut parents: BTreeMap<NodeId, usize> = BTreeMap::new();
    for id in tree.node_ids() {
        if let Some(node) = tree.get_node(id) {
            for &child in &node.children {
                *parents.entry(child).or_default() += 1;
            }
        }
    }
    if let Some((&id, _)) = parents.iter().find(|(_, count)| **count > 1) {
        return Err(OutgroupError::InvalidTree(format!(
            "node {} has more than one parent",
            id
        )));
    }

    let reachable = tree.preorder(root);
    if reachable.len() != tree.len() {
        return Err(OutgroupError::InvalidTree(format!(
            "{} of {} nodes are not connected to the root",
            tree.len() - reachable.len(),
            tree.len()
        )));
    }

    let mut seen = BTreeSet::new();
    for id in reachable {
        let name = tree.name_of(id);
        if name.is_empty() {
            return Err(OutgroupError::InvalidTree(format!("node {} has no name", id)));
        }
        if !seen.insert(name) {
            return Err(OutgroupError::InvalidTree(format!(
                "name {} is used more than once",
                name
            )));
        }
    }

    Ok(root)
}

/// Splices out every internal node that is not a subtree root, connecting its
/// parent directly to its children.
pub fn strip_non_events(
    tree: &mut Tree,
    root: NodeId,
    subtree_roots: &BTreeSet<String>,
) -> Result<(), OutgroupError> {
    for id in tree.preorder(root) {
        let node = match tree.get_node(id) {
            Some(n) => n,
            None => continue,
        };
        if node.is_leaf() || subtree_roots.contains(node.label()) {
            continue;
        }
        if node.parent.is_none() {
            return Err(OutgroupError::InvalidTree(format!(
                "{} is not a subtree root but has no parent",
                node.label()
            )));
        }

        log::debug!("Stripping non-event {}", node.label());
        tree.collapse_node(id).map_err(OutgroupError::InvalidTree)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_rejects_bad_trees() {
        let tree = Tree::from_newick("((A,B),C)root;").unwrap();
        assert!(matches!(
            OutgroupContext::import_tree(&tree, None),
            Err(OutgroupError::InvalidTree(_))
        ));

        let tree = Tree::from_newick("((A,B)X,A)root;").unwrap();
        assert!(matches!(
            OutgroupContext::import_tree(&tree, None),
            Err(OutgroupError::InvalidTree(_))
        ));

        // detached node
        let mut tree = Tree::from_newick("((A,B)X,C)root;").unwrap();
        let orphan = tree.add_node();
        tree.get_node_mut(orphan).unwrap().set_name("D");
        assert!(matches!(
            OutgroupContext::import_tree(&tree, None),
            Err(OutgroupError::InvalidTree(_))
        ));

        assert!(OutgroupContext::import_tree(&Tree::new(), None).is_err());
    }

    #[test]
    fn test_import_rejects_multiple_parents() {
        let mut tree = Tree::from_newick("((A,B)X,(C,D)Y)root;").unwrap();
        let a = tree.get_node_by_name("A").unwrap();
        let y = tree.get_node_by_name("Y").unwrap();
        tree.get_node_mut(y).unwrap().children.push(a);

        match OutgroupContext::import_tree(&tree, None) {
            Err(OutgroupError::InvalidTree(msg)) => assert!(msg.contains("more than one parent")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_strip_non_events() {
        let tree = Tree::from_newick("(((A:1,B:1)X:1,C:2)Y:1,D:3)root;").unwrap();
        let events: BTreeSet<String> = ["root", "X"].iter().map(|s| s.to_string()).collect();
        let ctx = OutgroupContext::import_tree(&tree, Some(&events)).unwrap();

        let t = ctx.tree();
        assert!(t.get_node_by_name("Y").is_none());
        let x = t.get_node_by_name("X").unwrap();
        let c = t.get_node_by_name("C").unwrap();
        assert_eq!(t.get_node(x).unwrap().parent, Some(ctx.root()));
        assert_eq!(t.get_node(x).unwrap().length, Some(2.0));
        assert_eq!(t.get_node(c).unwrap().length, Some(3.0));
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn test_strip_requires_parent() {
        let tree = Tree::from_newick("((A,B)X,C)root;").unwrap();
        let events: BTreeSet<String> = ["X"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            OutgroupContext::import_tree(&tree, Some(&events)),
            Err(OutgroupError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_restore_and_clear() {
        let tree = Tree::from_newick("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;").unwrap();
        let mut ctx = OutgroupContext::import_tree(&tree, None).unwrap();

        let mut map = OutgroupMap::new();
        map.insert(
            "X".to_string(),
            vec![("D".to_string(), 3.0), ("Y".to_string(), 2.0)],
        );
        ctx.restore(&map).unwrap();

        assert_eq!(
            ctx.outgroups()["X"],
            vec![("Y".to_string(), 2.0), ("D".to_string(), 3.0)]
        );
        assert_eq!(ctx.dag().outgroup_edges().len(), 2);

        ctx.clear_assignments();
        assert!(ctx.outgroups().is_empty());
        assert!(ctx.dag().outgroup_edges().is_empty());
    }

    #[test]
    fn test_restore_rejects() {
        let tree = Tree::from_newick("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;").unwrap();
        let mut ctx = OutgroupContext::import_tree(&tree, None).unwrap();

        let mut map = OutgroupMap::new();
        map.insert("X".to_string(), vec![("A".to_string(), 1.0)]);
        assert!(matches!(
            ctx.restore(&map),
            Err(OutgroupError::InvalidAssignment(_))
        ));

        let mut map = OutgroupMap::new();
        map.insert("X".to_string(), vec![("Z".to_string(), 1.0)]);
        assert!(ctx.restore(&map).is_err());

        // X -> Y and Y -> X cannot both hold
        let mut map = OutgroupMap::new();
        map.insert("X".to_string(), vec![("Y".to_string(), 2.0)]);
        map.insert("Y".to_string(), vec![("X".to_string(), 2.0)]);
        assert!(matches!(
            ctx.restore(&map),
            Err(OutgroupError::InvalidAssignment(_))
        ));
    }
}
