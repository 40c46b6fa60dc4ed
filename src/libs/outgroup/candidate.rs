use crate::libs::phylo::{NodeId, Tree};
use std::collections::{BTreeMap, BTreeSet};

/// Decides whether a node may serve as an outgroup.
///
/// Without a candidate set every node qualifies. With one, a node qualifies
/// when it is a member, or when at least `min_frac` of its leaves are members.
/// Results are memoized for the lifetime of the filter, which is one run.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    candidates: BTreeSet<String>,
    memo: BTreeMap<String, bool>,
}

impl CandidateFilter {
    pub fn new(candidates: Option<&BTreeSet<String>>) -> Self {
        let candidates = candidates.cloned().unwrap_or_default();
        let memo = candidates.iter().map(|name| (name.clone(), true)).collect();

        Self { candidates, memo }
    }

    pub fn is_candidate(&mut self, tree: &Tree, node: NodeId, min_frac: f64) -> bool {
        if self.candidates.is_empty() {
            return true;
        }

        let name = tree.name_of(node);
        if let Some(&hit) = self.memo.get(name) {
            return hit;
        }

        let leaves = tree.get_leaves(node);
        let hit = if leaves.is_empty() {
            false
        } else {
            let members = leaves
                .iter()
                .filter(|&&leaf| self.candidates.contains(tree.name_of(leaf)))
                .count();
            members as f64 / leaves.len() as f64 >= min_frac
        };

        self.memo.insert(name.to_string(), hit);
        hit
    }
}
