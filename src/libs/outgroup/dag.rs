use crate::libs::phylo::{NodeId, Tree};
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    Tree,
    Outgroup,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DagEdge {
    pub kind: EdgeKind,
    /// Branch length for tree edges, tree distance for outgroup edges
    pub weight: f64,
}

/// The input tree plus outgroup edges (ancestor -> outgroup).
/// Never contains a cycle.
#[derive(Debug, Clone)]
pub struct OutgroupDag {
    graph: StableDiGraph<NodeId, DagEdge>,
    index_of: BTreeMap<NodeId, NodeIndex>,
    names: BTreeMap<NodeId, String>,
}

impl OutgroupDag {
    pub fn from_tree(tree: &Tree, root: NodeId) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index_of = BTreeMap::new();
        let mut names = BTreeMap::new();

        for id in tree.preorder(root) {
            index_of.insert(id, graph.add_node(id));
            names.insert(id, tree.name_of(id).to_string());
        }
        for id in tree.preorder(root) {
            if let Some(parent) = tree.get_node(id).and_then(|n| n.parent) {
                let edge = DagEdge {
                    kind: EdgeKind::Tree,
                    weight: tree.get_node(id).and_then(|n| n.length).unwrap_or(1.0),
                };
                graph.add_edge(index_of[&parent], index_of[&id], edge);
            }
        }

        Self {
            graph,
            index_of,
            names,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges leaving `id`, tree and outgroup alike
    pub fn out_degree(&self, id: NodeId) -> usize {
        match self.index_of.get(&id) {
            Some(&idx) => self.graph.edges_directed(idx, Direction::Outgoing).count(),
            None => 0,
        }
    }

    fn find_outgroup_edge(&self, source: NodeIndex, sink: NodeIndex) -> Option<EdgeIndex> {
        self.graph
            .edges_connecting(source, sink)
            .find(|e| e.weight().kind == EdgeKind::Outgroup)
            .map(|e| e.id())
    }

    pub fn has_outgroup_edge(&self, source: NodeId, sink: NodeId) -> bool {
        match (self.index_of.get(&source), self.index_of.get(&sink)) {
            (Some(&s), Some(&t)) => self.find_outgroup_edge(s, t).is_some(),
            _ => false,
        }
    }

    /// Adds the outgroup edge `source -> sink`, then takes it back out if it
    /// closed a cycle. Returns whether the graph holds the edge afterwards.
    /// An edge that is already present is kept as is.
    pub fn try_add_outgroup(&mut self, source: NodeId, sink: NodeId, weight: f64) -> bool {
        let (s, t) = match (self.index_of.get(&source), self.index_of.get(&sink)) {
            (Some(&s), Some(&t)) => (s, t),
            _ => return false,
        };
        if self.find_outgroup_edge(s, t).is_some() {
            return true;
        }

        let edge = self.graph.add_edge(
            s,
            t,
            DagEdge {
                kind: EdgeKind::Outgroup,
                weight,
            },
        );
        // The graph was acyclic before, so any cycle runs through the new edge
        if has_path_connecting(&self.graph, t, s, None) {
            self.graph.remove_edge(edge);
            return false;
        }

        true
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    pub fn clear_outgroups(&mut self) {
        self.graph
            .retain_edges(|g, e| g[e].kind == EdgeKind::Tree);
    }

    /// `(source, sink, weight)` of every outgroup edge, ordered by source then sink
    pub fn outgroup_edges(&self) -> Vec<(NodeId, NodeId, f64)> {
        let mut edges: Vec<(NodeId, NodeId, f64)> = self
            .graph
            .edge_references()
            .filter(|e| e.weight().kind == EdgeKind::Outgroup)
            .map(|e| (self.graph[e.source()], self.graph[e.target()], e.weight().weight))
            .collect();
        edges.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        edges
    }

    /// Height of every node reachable from `root`: 0 without out-edges,
    /// otherwise one more than the highest successor. Outgroup edges count.
    pub fn height_table(&self, root: NodeId) -> BTreeMap<NodeId, i64> {
        fn visit(dag: &OutgroupDag, idx: NodeIndex, heights: &mut BTreeMap<NodeId, i64>) -> i64 {
            let id = dag.graph[idx];
            if let Some(&h) = heights.get(&id) {
                return h;
            }
            let successors: Vec<NodeIndex> = dag
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .collect();
            let height = successors
                .into_iter()
                .map(|next| visit(dag, next, heights) + 1)
                .max()
                .unwrap_or(0);
            heights.insert(id, height);
            height
        }

        let mut heights = BTreeMap::new();
        if let Some(&idx) = self.index_of.get(&root) {
            visit(self, idx, &mut heights);
        }
        heights
    }

    /// Graphviz DOT. Tree edges are solid, outgroup edges dashed.
    pub fn to_dot(&self) -> String {
        let mut s = String::from("digraph Outgroups {\n");
        s.push_str("    node [shape=box];\n");

        for (&id, &idx) in &self.index_of {
            s.push_str(&format!("    {} [label=\"{}\"];\n", id, self.names[&id]));

            let mut edges: Vec<(EdgeKind, NodeId, f64)> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| (e.weight().kind, self.graph[e.target()], e.weight().weight))
                .collect();
            edges.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

            for (kind, target, weight) in edges {
                let attrs = match kind {
                    EdgeKind::Tree => format!("label=\"{}\"", weight),
                    EdgeKind::Outgroup => {
                        format!("style=dashed, color=red, label=\"{}\"", weight)
                    }
                };
                s.push_str(&format!("    {} -> {} [{}];\n", id, target, attrs));
            }
        }

        s.push_str("}\n");
        s
    }
}
