use clap::*;
use ogsel::libs::outgroup::SeqStatTable;

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("seqstat")
        .about("Sequence statistics of every node")
        .after_help(
            r###"
Measures the genome of every leaf and propagates the numbers up the tree.
An ancestor gets the smallest sequence count and the largest total length
found among its leaves.

Output columns: name, count, total length. Nodes are listed in level order.

Notes:
* Every leaf needs a sequence source, a FASTA file or a directory of them
* Plain and gzipped (.gz) FASTA files are accepted

Examples:
1. Statistics from individual files:
   ogsel seqstat tree.nwk -s Human=hg38.fa.gz -s Chimp=panTro/ -s Mouse=mm10.fa

2. Statistics from a list:
   ogsel seqstat tree.nwk --seq-list genomes.tsv -o stats.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("seq")
                .long("seq")
                .short('s')
                .num_args(1)
                .action(ArgAction::Append)
                .help("Sequence source of a genome, as NAME=PATH"),
        )
        .arg(
            Arg::new("seq_list")
                .long("seq-list")
                .num_args(1)
                .help("Tab-separated file of names and sequence paths"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = ogsel::writer(args.get_one::<String>("outfile").unwrap());

    let tree = utils::load_tree(infile)?;
    let leaf_stats = utils::read_seqs(args)?;
    let table = SeqStatTable::from_leaves(&tree, &leaf_stats)?;

    let root = tree
        .get_root()
        .ok_or_else(|| anyhow::anyhow!("The tree in {} has no root", infile))?;
    for id in tree.levelorder(root) {
        if let Some(stat) = table.get(id) {
            writer.write_fmt(format_args!(
                "{}\t{}\t{}\n",
                tree.name_of(id),
                stat.count,
                stat.total_len
            ))?;
        }
    }

    Ok(())
}
