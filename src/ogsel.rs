extern crate clap;
use clap::*;

mod cmd_ogsel;

fn main() -> anyhow::Result<()> {
    let app = Command::new("ogsel")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`ogsel` - Outgroup selection for progressive genome alignment")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Verbosity: -v for info, -vv for debug"),
        )
        .subcommand(cmd_ogsel::greedy::make_subcommand())
        .subcommand(cmd_ogsel::dynamic::make_subcommand())
        .subcommand(cmd_ogsel::seqstat::make_subcommand())
        .subcommand(cmd_ogsel::label::make_subcommand())
        .after_help(
            r###"Subcommands:

* Outgroups:
    * greedy  - Nearest valid candidates, any node may be an outgroup
    * dynamic - Fixed-size sets of leaves maximizing conserved sequence

* Inputs:
    * seqstat - Sequence statistics propagated to every node
    * label   - Name the ancestors the way the other subcommands do

"###,
        );

    let matches = app.get_matches();

    env_logger::Builder::new()
        .filter_level(match matches.get_count("verbose") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    match matches.subcommand() {
        Some(("greedy", sub_matches)) => cmd_ogsel::greedy::execute(sub_matches),
        Some(("dynamic", sub_matches)) => cmd_ogsel::dynamic::execute(sub_matches),
        Some(("seqstat", sub_matches)) => cmd_ogsel::seqstat::execute(sub_matches),
        Some(("label", sub_matches)) => cmd_ogsel::label::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
