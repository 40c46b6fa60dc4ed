use crate::libs::phylo::{NodeId, Tree};
use petgraph::algo::dijkstra;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::{Directed, EdgeType, Undirected};
use std::collections::BTreeMap;

/// `table[a][b]`, rows and columns ordered by node id
pub type DistanceTable = BTreeMap<NodeId, BTreeMap<NodeId, f64>>;

/// All-pairs shortest paths over the tree edges.
#[derive(Debug, Clone, Default)]
pub struct DistanceTables {
    /// Along edge direction only: `b` is reachable iff it is `a` or below `a`
    pub directed: DistanceTable,
    /// Edge direction ignored
    pub undirected: DistanceTable,
}

impl DistanceTables {
    /// Runs Dijkstra from every node reachable from `root`.
    /// A missing branch length counts as 1, a negative one as 0.
    pub fn build(tree: &Tree, root: NodeId) -> Self {
        let directed: Graph<NodeId, f64, Directed> = tree_graph(tree, root);
        let undirected: Graph<NodeId, f64, Undirected> = tree_graph(tree, root);

        Self {
            directed: all_pairs(&directed),
            undirected: all_pairs(&undirected),
        }
    }

    /// True when one node is an ancestor of the other (or they are the same).
    ///
    /// ```
    /// use ogsel::libs::outgroup::DistanceTables;
    /// use ogsel::libs::phylo::Tree;
    ///
    /// let tree = Tree::from_newick("((A,B)X,C)root;").unwrap();
    /// let dist = DistanceTables::build(&tree, 0);
    /// // ids follow preorder: root, X, A, B, C
    /// assert!(dist.on_same_path(2, 1));
    /// assert!(!dist.on_same_path(1, 4));
    /// ```
    pub fn on_same_path(&self, a: NodeId, b: NodeId) -> bool {
        let reaches = |from: NodeId, to: NodeId| {
            self.directed
                .get(&from)
                .is_some_and(|row| row.contains_key(&to))
        };
        reaches(a, b) || reaches(b, a)
    }

    /// Undirected distance between two nodes
    pub fn distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.undirected.get(&a).and_then(|row| row.get(&b)).copied()
    }
}

fn tree_graph<Ty: EdgeType>(tree: &Tree, root: NodeId) -> Graph<NodeId, f64, Ty> {
    let mut graph = Graph::default();
    let mut index_of: BTreeMap<NodeId, NodeIndex> = BTreeMap::new();

    for id in tree.preorder(root) {
        let idx = graph.add_node(id);
        index_of.insert(id, idx);

        if let Some(node) = tree.get_node(id) {
            if let Some(parent) = node.parent {
                let weight = node.length.map(|l| l.max(0.0)).unwrap_or(1.0);
                graph.add_edge(index_of[&parent], idx, weight);
            }
        }
    }

    graph
}

fn all_pairs<Ty: EdgeType>(graph: &Graph<NodeId, f64, Ty>) -> DistanceTable {
    let mut table = DistanceTable::new();

    for start in graph.node_indices() {
        let row: BTreeMap<NodeId, f64> = dijkstra(graph, start, None, |e| *e.weight())
            .into_iter()
            .map(|(idx, d)| (graph[idx], d))
            .collect();
        table.insert(graph[start], row);
    }

    table
}
