use clap::*;

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("label")
        .about("Names the unnamed ancestors")
        .after_help(
            r###"
Writes the first tree of the input back as Newick, with every unnamed
internal node named Anc0, Anc1, ... in level order. Names already in use are
skipped.

These are the names `greedy`, `dynamic` and `seqstat` report, so the output
shows which node each line refers to.

Examples:
1. Name the ancestors:
   echo "((A,B),(C,D));" | ogsel label stdin

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
    writer.write_fmt(format_args!("{}\n", tree.to_newick()))?;

    Ok(())
}
