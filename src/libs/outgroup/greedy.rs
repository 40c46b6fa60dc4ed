use super::{CandidateFilter, OutgroupContext, OutgroupError, OutgroupStrategy};
use crate::libs::phylo::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// Nearest-first outgroup assignment.
///
/// Every pair of non-root nodes is visited in order of increasing tree
/// distance, and the sink becomes an outgroup of the source unless one of
/// the constraints below rejects it:
///
/// * the source is a leaf, or already has `max_num_outgroups` outgroups
/// * the sink is not a candidate
/// * the sink is more than `threshold` levels above the source in the
///   augmented graph
/// * source and sink share a root path
/// * the outgroup edge would close a cycle
#[derive(Debug, Clone)]
pub struct Greedy {
    /// Maximum height difference between an ancestor and its outgroup
    pub threshold: Option<usize>,
    /// Names allowed as outgroups. `None` allows every node.
    pub candidates: Option<BTreeSet<String>>,
    /// Minimum fraction of candidate leaves below an internal node
    /// for the node itself to qualify
    pub candidate_child_frac: f64,
    pub max_num_outgroups: usize,
}

impl Default for Greedy {
    fn default() -> Self {
        Self {
            threshold: None,
            candidates: None,
            candidate_child_frac: 2.0,
            max_num_outgroups: 1,
        }
    }
}

impl Greedy {
    /// `(source, sink, distance)` for every ordered pair of non-root nodes,
    /// nearest first. Equal distances keep ascending `(source, sink)` order.
    fn sorted_pairs(ctx: &OutgroupContext) -> Vec<(NodeId, NodeId, f64)> {
        let mut pairs: Vec<(NodeId, NodeId, f64)> = ctx
            .dist
            .undirected
            .iter()
            .filter(|&(&source, _)| source != ctx.root)
            .flat_map(|(&source, row)| {
                row.iter()
                    .filter(|&(&sink, _)| sink != ctx.root)
                    .map(move |(&sink, &dist)| (source, sink, dist))
            })
            .collect();
        pairs.sort_by(|a, b| a.2.total_cmp(&b.2));
        pairs
    }
}

impl OutgroupStrategy for Greedy {
    fn assign(&self, ctx: &mut OutgroupContext) -> Result<(), OutgroupError> {
        let pairs = Self::sorted_pairs(ctx);

        let mut finished: BTreeSet<NodeId> = BTreeSet::new();
        let mut filter = CandidateFilter::new(self.candidates.as_ref());
        let mut heights: BTreeMap<NodeId, i64> = ctx.dag.height_table(ctx.root);
        let mut added = 0;

        for (source, sink, dist) in pairs {
            let source_name = ctx.tree.name_of(source).to_string();

            if ctx.dag.out_degree(source) == 0
                || ctx.num_outgroups(&source_name) >= self.max_num_outgroups
            {
                finished.insert(source);
                continue;
            }
            if !filter.is_candidate(&ctx.tree, sink, self.candidate_child_frac) {
                log::debug!("{}: {} is not a candidate", source_name, ctx.tree.name_of(sink));
                continue;
            }

            let source_height = heights.get(&source).copied().unwrap_or(0);
            let sink_height = heights.get(&sink).copied().unwrap_or(0);
            if let Some(threshold) = self.threshold {
                if sink_height - source_height + 1 > threshold as i64 {
                    log::debug!(
                        "{}: {} is {} levels up, over the threshold",
                        source_name,
                        ctx.tree.name_of(sink),
                        sink_height - source_height + 1
                    );
                    continue;
                }
            }

            if finished.contains(&source) || ctx.dist.on_same_path(source, sink) {
                continue;
            }
            if !ctx.dag.try_add_outgroup(source, sink, dist) {
                log::debug!(
                    "{}: {} would close a cycle",
                    source_name,
                    ctx.tree.name_of(sink)
                );
                continue;
            }

            heights.insert(source, source_height.max(sink_height + 1));

            let sink_name = ctx.tree.name_of(sink).to_string();
            if ctx.push_outgroup(&source_name, &sink_name, dist)? {
                added += 1;
                if ctx.num_outgroups(&source_name) >= self.max_num_outgroups {
                    finished.insert(source);
                }
            }
        }

        ctx.sort_outgroups();
        log::info!(
            "Greedy: {} new outgroups, {} ancestors assigned",
            added,
            ctx.og_map.len()
        );

        Ok(())
    }
}
