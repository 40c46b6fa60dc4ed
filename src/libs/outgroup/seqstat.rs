use super::OutgroupError;
use crate::libs::phylo::{NodeId, Tree};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

/// Record count and total sequence length of a genome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeqStat {
    pub count: u64,
    pub total_len: u64,
}

impl SeqStat {
    pub fn new(count: u64, total_len: u64) -> Self {
        Self { count, total_len }
    }

    /// Counts the records of a FASTA stream and sums their lengths.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut fa_in = noodles_fasta::io::Reader::new(reader);
        let mut stat = SeqStat::default();

        for result in fa_in.records() {
            let record = result?;
            stat.count += 1;
            stat.total_len += record.sequence().len() as u64;
        }

        Ok(stat)
    }

    /// Reads a FASTA file, plain or `.gz`. A directory is read file by file,
    /// in name order, and the results are summed.
    ///
    /// ```
    /// use std::io::Write;
    /// use ogsel::libs::outgroup::SeqStat;
    ///
    /// let mut file = tempfile::NamedTempFile::new().unwrap();
    /// write!(file, ">chr1\nACGT\nAC\n>chr2\nGGG\n").unwrap();
    ///
    /// let stat = SeqStat::from_path("A", file.path().to_str().unwrap()).unwrap();
    /// assert_eq!(stat, SeqStat::new(2, 9));
    /// ```
    pub fn from_path(name: &str, path: &str) -> Result<Self, OutgroupError> {
        let missing = || OutgroupError::MissingSequenceData {
            name: name.to_string(),
            path: path.to_string(),
        };

        let files: Vec<String> = if Path::new(path).is_dir() {
            let mut files = vec![];
            for entry in std::fs::read_dir(path).map_err(|_| missing())? {
                let entry = entry.map_err(|_| missing())?;
                if entry.path().is_file() {
                    files.push(entry.path().to_string_lossy().to_string());
                }
            }
            files.sort();
            files
        } else {
            vec![path.to_string()]
        };

        let mut stat = SeqStat::default();
        for file in &files {
            let reader = crate::libs::io::open_reader(file).map_err(|_| missing())?;
            let part = SeqStat::from_reader(reader).map_err(|_| missing())?;
            log::debug!("{}: {} sequences, {} bp", file, part.count, part.total_len);

            stat.count += part.count;
            stat.total_len += part.total_len;
        }

        Ok(stat)
    }
}

/// Statistics for every node of a tree. Leaves carry measured values, an
/// ancestor the smallest count and the largest total length below it.
#[derive(Debug, Clone)]
pub struct SeqStatTable {
    stats: BTreeMap<NodeId, SeqStat>,
    root: NodeId,
}

impl SeqStatTable {
    pub fn from_leaves(
        tree: &Tree,
        leaf_stats: &BTreeMap<String, SeqStat>,
    ) -> Result<Self, OutgroupError> {
        let root = tree
            .get_root()
            .ok_or_else(|| OutgroupError::InvalidTree("the tree has no root".to_string()))?;

        let mut stats = BTreeMap::new();
        for (name, stat) in leaf_stats {
            let id = tree.get_node_by_name(name).ok_or_else(|| {
                OutgroupError::InvalidTree(format!("{} is not a node of the tree", name))
            })?;
            if tree.is_leaf(id) {
                stats.insert(id, *stat);
            } else {
                log::warn!("{} is an ancestor, its statistics are derived instead", name);
            }
        }

        for id in tree.postorder(root) {
            let node = match tree.get_node(id) {
                Some(n) => n,
                None => continue,
            };
            if node.is_leaf() {
                if !stats.contains_key(&id) {
                    return Err(OutgroupError::MissingSequenceData {
                        name: node.label().to_string(),
                        path: "(none)".to_string(),
                    });
                }
                continue;
            }

            let merged = node
                .children
                .iter()
                .filter_map(|child| stats.get(child))
                .fold(None, |acc: Option<SeqStat>, s| {
                    Some(match acc {
                        None => *s,
                        Some(a) => SeqStat::new(a.count.min(s.count), a.total_len.max(s.total_len)),
                    })
                })
                .unwrap_or_default();
            stats.insert(id, merged);
        }

        Ok(Self { stats, root })
    }

    pub fn get(&self, id: NodeId) -> Option<&SeqStat> {
        self.stats.get(&id)
    }

    /// Statistics of the whole tree
    pub fn root_stat(&self) -> SeqStat {
        self.stats.get(&self.root).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &SeqStat)> {
        self.stats.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn leaf_stats(list: &[(&str, u64, u64)]) -> BTreeMap<String, SeqStat> {
        list.iter()
            .map(|(n, c, l)| (n.to_string(), SeqStat::new(*c, *l)))
            .collect()
    }

    #[test]
    fn test_seqstat_from_reader() {
        let fa = ">a\nACGTN\nAC\n>b desc\nTT\n>c\nG\n";
        let stat = SeqStat::from_reader(fa.as_bytes()).unwrap();
        assert_eq!(stat, SeqStat::new(3, 10));

        let stat = SeqStat::from_reader("".as_bytes()).unwrap();
        assert_eq!(stat, SeqStat::default());
    }

    #[test]
    fn test_seqstat_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut f1 = std::fs::File::create(dir.path().join("chr1.fa")).unwrap();
        write!(f1, ">chr1\nACGTACGT\n").unwrap();
        let f2 = std::fs::File::create(dir.path().join("chr2.fa.gz")).unwrap();
        let mut gz = flate2::write::GzEncoder::new(f2, flate2::Compression::default());
        write!(gz, ">chr2\nAAAA\n>chr3\nCC\n").unwrap();
        gz.finish().unwrap();

        let stat = SeqStat::from_path("A", dir.path().to_str().unwrap()).unwrap();
        assert_eq!(stat, SeqStat::new(3, 14));
    }

    #[test]
    fn test_seqstat_missing() {
        let err = SeqStat::from_path("A", "tests/no/such/genome.fa").unwrap_err();
        assert_eq!(
            err,
            OutgroupError::MissingSequenceData {
                name: "A".to_string(),
                path: "tests/no/such/genome.fa".to_string()
            }
        );
    }

    #[test]
    fn test_seqstat_table() {
        let tree = Tree::from_newick("((A,B)X,C)root;").unwrap();
        let stats = leaf_stats(&[("A", 10, 1000), ("B", 5, 800), ("C", 20, 1200)]);
        let table = SeqStatTable::from_leaves(&tree, &stats).unwrap();
        let id = |name: &str| tree.get_node_by_name(name).unwrap();

        assert_eq!(table.get(id("A")), Some(&SeqStat::new(10, 1000)));
        assert_eq!(table.get(id("X")), Some(&SeqStat::new(5, 1000)));
        assert_eq!(table.root_stat(), SeqStat::new(5, 1200));
        assert_eq!(table.iter().count(), 5);
    }

    #[test]
    fn test_seqstat_table_errors() {
        let tree = Tree::from_newick("((A,B)X,C)root;").unwrap();

        let stats = leaf_stats(&[("A", 1, 1), ("B", 1, 1)]);
        assert!(matches!(
            SeqStatTable::from_leaves(&tree, &stats),
            Err(OutgroupError::MissingSequenceData { .. })
        ));

        let stats = leaf_stats(&[("A", 1, 1), ("B", 1, 1), ("C", 1, 1), ("Z", 1, 1)]);
        assert!(matches!(
            SeqStatTable::from_leaves(&tree, &stats),
            Err(OutgroupError::InvalidTree(_))
        ));
    }
}
