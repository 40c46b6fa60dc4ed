use super::{branch_conservation, OutgroupContext, OutgroupError, OutgroupStrategy};
use super::{SeqStat, SeqStatTable};
use crate::libs::phylo::{NodeId, Tree};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Best solution of one size below a node of the re-rooted tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DpEntry {
    /// Probability that a base of the root survives in at least one
    /// member of `solution`
    pub score: f64,
    pub solution: Vec<NodeId>,
}

/// Fixed-size outgroup sets chosen by dynamic programming.
///
/// For each ancestor, the tree is re-rooted at the ancestor with its own
/// descendants cut away. A bottom-up pass then picks the `num_og` leaves that
/// maximize the chance of a base surviving in at least one of them, where
/// survival along a branch is [`branch_conservation`].
///
/// Only leaves are ever selected. Splitting the budget over the children of
/// a node enumerates all `(num_og + 1)^children` combinations, so wide
/// multifurcations get expensive fast.
#[derive(Debug, Clone)]
pub struct Dynamic {
    pub num_og: usize,
    pub stats: SeqStatTable,
}

impl Dynamic {
    pub fn new(num_og: usize, stats: SeqStatTable) -> Self {
        Self { num_og, stats }
    }

    /// A copy of `tree` re-rooted at `ancestor`, without the descendants of `ancestor`.
    pub fn dp_tree(tree: &Tree, ancestor: NodeId) -> Result<Tree, OutgroupError> {
        let mut dp = tree.clone();
        let children = dp
            .get_node(ancestor)
            .map(|n| n.children.clone())
            .ok_or_else(|| OutgroupError::InvalidTree(format!("node {} not found", ancestor)))?;
        for child in children {
            dp.remove_node(child, true);
        }
        dp.reroot_at(ancestor).map_err(OutgroupError::InvalidTree)?;

        Ok(dp)
    }

    fn branch_prob(&self, dp: &Tree, id: NodeId, root_stat: &SeqStat) -> f64 {
        let stat = self.stats.get(id).copied().unwrap_or_default();
        let length = dp.get_node(id).and_then(|n| n.length);
        branch_conservation(&stat, root_stat, length)
    }

    /// `table[node][k]` for every node of the re-rooted tree and every size
    /// `k` in `0..=num_og`.
    pub fn dp_table(
        &self,
        tree: &Tree,
        ancestor: NodeId,
    ) -> Result<BTreeMap<NodeId, Vec<DpEntry>>, OutgroupError> {
        let dp = Self::dp_tree(tree, ancestor)?;
        let root_stat = self.stats.root_stat();
        let mut table: BTreeMap<NodeId, Vec<DpEntry>> = BTreeMap::new();

        for id in dp.postorder(ancestor) {
            let node = match dp.get_node(id) {
                Some(n) => n,
                None => continue,
            };
            let mut entries = vec![DpEntry::default(); self.num_og + 1];

            if node.is_leaf() {
                // former ancestors can end up as leaves here
                if id != ancestor && tree.is_leaf(id) && self.num_og > 0 {
                    entries[1] = DpEntry {
                        score: 1.0,
                        solution: vec![id],
                    };
                }
            } else {
                let branches: Vec<(NodeId, f64)> = node
                    .children
                    .iter()
                    .map(|&child| (child, self.branch_prob(&dp, child, &root_stat)))
                    .collect();

                for split in branches
                    .iter()
                    .map(|_| 0..=self.num_og)
                    .multi_cartesian_product()
                {
                    let k: usize = split.iter().sum();
                    if k > self.num_og {
                        continue;
                    }

                    let mut loss = 1.0;
                    let mut solution = vec![];
                    for (&(child, conservation), &child_k) in branches.iter().zip(&split) {
                        let entry = &table[&child][child_k];
                        loss *= 1.0 - conservation * entry.score;
                        solution.extend_from_slice(&entry.solution);
                    }

                    // a full-size set beats an unfilled slot even at score 0
                    let score = (1.0 - loss).clamp(0.0, 1.0);
                    let filled = entries[k].solution.len() == k;
                    if solution.len() == k && (!filled || score > entries[k].score) {
                        entries[k] = DpEntry { score, solution };
                    }
                }
            }

            table.insert(id, entries);
        }

        Ok(table)
    }

    /// Leaves chosen for `ancestor`: the best set of `num_og`, or the largest
    /// smaller one when fewer leaves are available.
    pub fn select(&self, tree: &Tree, ancestor: NodeId) -> Result<Vec<NodeId>, OutgroupError> {
        let table = self.dp_table(tree, ancestor)?;
        let solution = table
            .get(&ancestor)
            .and_then(|entries| entries.iter().rev().find(|e| !e.solution.is_empty()))
            .map(|e| e.solution.clone())
            .unwrap_or_default();

        Ok(solution)
    }
}

impl OutgroupStrategy for Dynamic {
    fn assign(&self, ctx: &mut OutgroupContext) -> Result<(), OutgroupError> {
        if self.num_og == 0 {
            return Ok(());
        }

        let ancestors: Vec<NodeId> = ctx
            .tree
            .levelorder(ctx.root)
            .into_iter()
            .filter(|&id| !ctx.tree.is_leaf(id))
            .collect();

        let tree = &ctx.tree;
        let solutions: Vec<(NodeId, Vec<NodeId>)> = ancestors
            .par_iter()
            .map(|&ancestor| self.select(tree, ancestor).map(|s| (ancestor, s)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = 0;
        for (ancestor, solution) in solutions {
            let ancestor_name = ctx.tree.name_of(ancestor).to_string();

            let mut picked: Vec<(NodeId, f64)> = solution
                .into_iter()
                .filter_map(|leaf| ctx.dist.distance(ancestor, leaf).map(|d| (leaf, d)))
                .collect();
            picked.sort_by(|a, b| a.1.total_cmp(&b.1));

            for (leaf, dist) in picked {
                if ctx.num_outgroups(&ancestor_name) >= self.num_og {
                    break;
                }
                let leaf_name = ctx.tree.name_of(leaf).to_string();
                if !ctx.dag.try_add_outgroup(ancestor, leaf, dist) {
                    log::debug!("{}: {} would close a cycle", ancestor_name, leaf_name);
                    continue;
                }
                if ctx.push_outgroup(&ancestor_name, &leaf_name, dist)? {
                    added += 1;
                }
            }
        }

        ctx.sort_outgroups();
        log::info!(
            "Dynamic: {} new outgroups, {} ancestors assigned",
            added,
            ctx.og_map.len()
        );

        Ok(())
    }
}
