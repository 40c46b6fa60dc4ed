use clap::*;
use ogsel::libs::outgroup::{Greedy, OutgroupStrategy};
use std::collections::BTreeSet;

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("greedy")
        .about("Assigns the nearest valid outgroups to every ancestor")
        .after_help(
            r###"
Visits every pair of non-root nodes in order of increasing tree distance and
makes the second node an outgroup of the first, unless:

* the first node is a leaf or already has `--num` outgroups
* the second node is not a candidate (`--candidate`, `--leaves-only`)
* the second node sits more than `--threshold` levels above the first
* the two nodes lie on one root path
* the assignment would make the outgroup graph cyclic

Notes:
* Unnamed ancestors are named Anc0, Anc1, ... in level order
* Only the first tree of the input is used
* `--candidate` restricts outgroups to the given nodes, plus the ancestors
  with at least `--frac` of their leaves among them
* `--leaves-only` without `--candidate` allows every leaf and no ancestor
* `--previous` reads an earlier TSV output and extends it
* Output formats:
    * tsv - ancestor, outgroup and distance, one assignment per line
    * dot - the tree with outgroup edges dashed, for Graphviz

Examples:
1. One outgroup per ancestor:
   ogsel greedy tree.nwk

2. Up to three leaves per ancestor:
   ogsel greedy tree.nwk -n 3 --leaves-only

3. Limit the depth each outgroup adds to the schedule:
   ogsel greedy tree.nwk -t 1

4. Draw the result:
   ogsel greedy tree.nwk --format dot | dot -Tpdf -o outgroups.pdf

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
            Arg::new("threshold")
                .long("threshold")
                .short('t')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Maximum number of levels an outgroup may sit above its ancestor"),
        )
        .arg(
            Arg::new("num")
                .long("num")
                .short('n')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Maximum number of outgroups per ancestor"),
        )
        .arg(
            Arg::new("candidate")
                .long("candidate")
                .short('c')
                .num_args(1)
                .action(ArgAction::Append)
                .help("Node allowed as an outgroup"),
        )
        .arg(
            Arg::new("leaves_only")
                .long("leaves-only")
                .action(ArgAction::SetTrue)
                .help("Never use an ancestor as an outgroup"),
        )
        .arg(
            Arg::new("frac")
                .long("frac")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("2.0")
                .help("Fraction of candidate leaves making an ancestor a candidate"),
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
            Arg::new("previous")
                .long("previous")
                .num_args(1)
                .help("Outgroups from an earlier run, to be extended"),
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
    let mut writer = ogsel::writer(args.get_one::<String>("outfile").unwrap());

    let tree = utils::load_tree(infile)?;

    let leaves_only = args.get_flag("leaves_only");
    let mut candidates: Option<BTreeSet<String>> = args
        .get_many::<String>("candidate")
        .map(|names| names.cloned().collect());
    if leaves_only && candidates.is_none() {
        let root = tree
            .get_root()
            .ok_or_else(|| anyhow::anyhow!("The tree in {} has no root", infile))?;
        candidates = Some(
            tree.get_leaves(root)
                .iter()
                .map(|&id| tree.name_of(id).to_string())
                .collect(),
        );
    }

    let greedy = Greedy {
        threshold: args.get_one::<usize>("threshold").copied(),
        candidates,
        candidate_child_frac: if leaves_only {
            1.1
        } else {
            *args.get_one::<f64>("frac").unwrap()
        },
        max_num_outgroups: *args.get_one::<usize>("num").unwrap(),
    };

    //----------------------------
    // Operating
    //----------------------------
    let mut ctx = utils::import_tree(&tree, args)?;
    if let Some(previous) = args.get_one::<String>("previous") {
        let map = utils::read_outgroups(previous)?;
        ctx.restore(&map)?;
    }

    greedy.assign(&mut ctx)?;

    //----------------------------
    // Output
    //----------------------------
    utils::write_outgroups(&mut writer, &ctx, format)?;

    Ok(())
}
