use clap::*;
use ogsel::libs::outgroup::{Dynamic, OutgroupStrategy, SeqStatTable};

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("dynamic")
        .about("Chooses a fixed number of leaf outgroups per ancestor")
        .after_help(
            r###"
For every ancestor, re-roots the tree at the ancestor, drops its descendants
and picks the `--num` leaves that give a base of the ancestor the best chance
of surviving in at least one of them.

Survival along a branch combines three losses:
* genome shrinkage: the node's total length against the root's
* fragmentation: sequences beyond the root's count, per root base
* substitution: Jukes-Cantor over the branch length; lengths missing or
  outside [0, 1) count as 0.1

Notes:
* Every leaf needs a sequence source, a FASTA file or a directory of them
* Plain and gzipped (.gz) FASTA files are accepted
* An ancestor with fewer than `--num` leaves outside it gets all of them
* The work for each ancestor runs in parallel with `--parallel` threads
* Time grows with (num + 1) ^ (number of children) at each node; keep `--num`
  small on multifurcating trees

Examples:
1. Two outgroups per ancestor:
   ogsel dynamic tree.nwk -s Human=hg38.fa -s Chimp=panTro.fa -s Mouse=mm10.fa

2. Sources from a two-column file:
   ogsel dynamic tree.nwk --seq-list genomes.tsv -n 3 --parallel 4

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
            Arg::new("num")
                .long("num")
                .short('n')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("2")
                .help("Number of outgroups per ancestor"),
        )
        .arg(
            Arg::new("subtree_root")
                .long("subtree-root")
                .short('r')
                .num_args(1)
                .action(ArgAction::Append)
                .help("Ancestor that is an alignment event; the others are spliced out"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("Number of threads for parallel processing"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .num_args(1)
                .value_parser(["tsv", "dot"])
                .default_value("tsv")
                .help("Output format"),
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
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let format = args.get_one::<String>("format").unwrap();
    let opt_num = *args.get_one::<usize>("num").unwrap();

    // Set the number of threads for rayon
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    let mut writer = ogsel::writer(args.get_one::<String>("outfile").unwrap());

    //----------------------------
    // Operating
    //----------------------------
    let tree = utils::load_tree(infile)?;
    let leaf_stats = utils::read_seqs(args)?;

    let mut ctx = utils::import_tree(&tree, args)?;
    let stats = SeqStatTable::from_leaves(ctx.tree(), &leaf_stats)?;
    Dynamic::new(opt_num, stats).assign(&mut ctx)?;

    //----------------------------
    // Output
    //----------------------------
    utils::write_outgroups(&mut writer, &ctx, format)?;

    Ok(())
}
