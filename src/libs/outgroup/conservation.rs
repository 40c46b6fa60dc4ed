use super::SeqStat;

/// Stands in for branch lengths that are missing or outside `[0, 1)`
pub const DEFAULT_BRANCH_LENGTH: f64 = 0.1;

/// Jukes-Cantor probability that a site differs after `branch_length`
/// substitutions per site.
pub fn jukes_cantor(branch_length: f64) -> f64 {
    0.75 - 0.75 * (-branch_length).exp()
}

/// Probability that a base survives the branch above a node.
///
/// Three independent losses are combined: shrinkage of the genome relative to
/// the root, fragmentation beyond the root's, and substitution along the branch.
///
/// ```
/// use ogsel::libs::outgroup::{branch_conservation, SeqStat};
///
/// let root = SeqStat::new(10, 1000);
/// // same genome, no branch: nothing lost
/// assert_eq!(branch_conservation(&root, &root, Some(0.0)), 1.0);
/// // half the genome
/// let half = SeqStat::new(10, 500);
/// assert!((branch_conservation(&half, &root, Some(0.0)) - 0.5).abs() < 1e-12);
/// ```
pub fn branch_conservation(stat: &SeqStat, root_stat: &SeqStat, branch_length: Option<f64>) -> f64 {
    let (p_loss, p_frag) = if root_stat.total_len == 0 {
        (0.0, 0.0)
    } else {
        let len_frac = stat.total_len as f64 / root_stat.total_len as f64;
        let extra_frag = stat.count.saturating_sub(root_stat.count);
        (
            (1.0 - len_frac).max(0.0),
            extra_frag as f64 / root_stat.total_len as f64,
        )
    };

    let branch_length = match branch_length {
        Some(l) if (0.0..1.0).contains(&l) => l,
        _ => {
            log::debug!(
                "Branch length {:?} replaced by {}",
                branch_length,
                DEFAULT_BRANCH_LENGTH
            );
            DEFAULT_BRANCH_LENGTH
        }
    };
    let p_mutation = jukes_cantor(branch_length);

    [p_loss, p_frag, p_mutation]
        .iter()
        .map(|p| 1.0 - p.clamp(0.0, 1.0))
        .product::<f64>()
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_jukes_cantor() {
        assert_relative_eq!(jukes_cantor(0.0), 0.0);
        assert_relative_eq!(jukes_cantor(0.1), 0.75 - 0.75 * (-0.1f64).exp());
        // saturates at 3/4
        assert_relative_eq!(jukes_cantor(100.0), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_branch_conservation() {
        let root = SeqStat::new(10, 1000);

        let same = branch_conservation(&root, &root, Some(0.2));
        assert_relative_eq!(same, 1.0 - jukes_cantor(0.2));

        // 100 extra fragments over 1000 bp
        let fragmented = SeqStat::new(110, 1000);
        assert_relative_eq!(
            branch_conservation(&fragmented, &root, Some(0.0)),
            0.9,
            epsilon = 1e-12
        );

        // a larger genome loses nothing
        let larger = SeqStat::new(10, 2000);
        assert_relative_eq!(branch_conservation(&larger, &root, Some(0.0)), 1.0);
    }

    #[test]
    fn test_branch_length_fallback() {
        let root = SeqStat::new(1, 100);
        let expected = 1.0 - jukes_cantor(DEFAULT_BRANCH_LENGTH);

        for length in [None, Some(-0.5), Some(1.0), Some(3.0)] {
            assert_relative_eq!(branch_conservation(&root, &root, length), expected);
        }
    }

    #[test]
    fn test_conservation_bounds() {
        let root = SeqStat::new(5, 10);
        let cases = [
            SeqStat::new(0, 0),
            SeqStat::new(50, 5),
            SeqStat::new(5, 10),
            SeqStat::new(1000, 10_000),
        ];
        for stat in cases {
            for length in [None, Some(0.0), Some(0.5), Some(0.99)] {
                let p = branch_conservation(&stat, &root, length);
                assert!((0.0..=1.0).contains(&p), "{:?} {:?} {}", stat, length, p);
            }
        }

        // empty root: only substitution counts
        let empty = SeqStat::default();
        assert_relative_eq!(
            branch_conservation(&SeqStat::new(3, 10), &empty, Some(0.5)),
            1.0 - jukes_cantor(0.5)
        );
    }
}
