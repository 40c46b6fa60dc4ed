use clap::ArgMatches;
use ogsel::libs::outgroup::{OutgroupContext, OutgroupMap, SeqStat};
use ogsel::libs::phylo::Tree;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

/// The first tree of `infile`, with unnamed ancestors named `Anc0`, `Anc1`, ...
pub fn load_tree(infile: &str) -> anyhow::Result<Tree> {
    let mut trees = Tree::from_file(infile)?;
    if trees.is_empty() {
        anyhow::bail!("No tree found in {}", infile);
    }
    if trees.len() > 1 {
        log::warn!("{} holds {} trees, only the first is used", infile, trees.len());
    }

    let mut tree = trees.swap_remove(0);
    let named = tree.name_ancestors("Anc");
    if named > 0 {
        log::info!("Named {} ancestors", named);
    }

    Ok(tree)
}

/// Names given by `--subtree-root`. `None` when the option is absent.
pub fn subtree_roots(args: &ArgMatches) -> Option<BTreeSet<String>> {
    args.get_many::<String>("subtree_root")
        .map(|names| names.cloned().collect())
}

/// Loads the context and, when `--subtree-root` is given, strips the other ancestors.
pub fn import_tree(tree: &Tree, args: &ArgMatches) -> anyhow::Result<OutgroupContext> {
    let roots = subtree_roots(args);
    Ok(OutgroupContext::import_tree(tree, roots.as_ref())?)
}

/// Sequence sources from `--seq NAME=PATH` and `--seq-list`, measured.
pub fn read_seqs(args: &ArgMatches) -> anyhow::Result<BTreeMap<String, SeqStat>> {
    let mut sources: Vec<(String, String)> = vec![];

    if let Some(seqs) = args.get_many::<String>("seq") {
        for seq in seqs {
            let (name, path) = seq
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected NAME=PATH: {}", seq))?;
            sources.push((name.to_string(), path.to_string()));
        }
    }
    if let Some(list) = args.get_one::<String>("seq_list") {
        sources.extend(ogsel::read_pairs(list)?);
    }

    let mut stats = BTreeMap::new();
    for (name, path) in sources {
        let stat = SeqStat::from_path(&name, &path)?;
        log::info!("{}: {} sequences, {} bp", name, stat.count, stat.total_len);
        stats.insert(name, stat);
    }

    Ok(stats)
}

/// Reads `ancestor<TAB>outgroup<TAB>distance` lines written by an earlier run.
pub fn read_outgroups(infile: &str) -> anyhow::Result<OutgroupMap> {
    let mut map = OutgroupMap::new();
    let reader = ogsel::libs::io::open_reader(infile)
        .map_err(|e| anyhow::anyhow!("Could not open {}: {}", infile, e))?;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            anyhow::bail!("Expected ancestor, outgroup and distance: {}", line);
        }
        let dist: f64 = fields[2].trim().parse()?;
        map.entry(fields[0].to_string())
            .or_default()
            .push((fields[1].to_string(), dist));
    }

    Ok(map)
}

pub fn write_outgroups(
    writer: &mut dyn Write,
    ctx: &OutgroupContext,
    format: &str,
) -> anyhow::Result<()> {
    match format {
        "dot" => writer.write_all(ctx.dag().to_dot().as_bytes())?,
        _ => {
            for (ancestor, outgroups) in ctx.outgroups() {
                for (outgroup, dist) in outgroups {
                    writer.write_fmt(format_args!("{}\t{}\t{}\n", ancestor, outgroup, dist))?;
                }
            }
        }
    }
    writer.flush()?;

    Ok(())
}
