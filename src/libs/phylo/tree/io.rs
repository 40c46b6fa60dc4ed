use super::Tree;
use crate::libs::phylo::node::NodeId;
use std::io::Read;

/// Read all Newick trees from a file.
///
/// # Arguments
/// * `infile` - Path to the input file (or "stdin" for stdin).
pub fn from_file(infile: &str) -> anyhow::Result<Vec<Tree>> {
    let mut reader = crate::libs::io::open_reader(infile)
        .map_err(|e| anyhow::anyhow!("Could not open {}: {}", infile, e))?;
    let mut newick = String::new();
    reader
        .read_to_string(&mut newick)
        .map_err(|e| anyhow::anyhow!("Read error: {}", e))?;
    Ok(Tree::from_newick_multi(newick.as_str())?)
}

/// Serialize tree to a single-line Newick string.
pub fn to_newick(tree: &Tree) -> String {
    match tree.get_root() {
        Some(root) => {
            let mut s = to_newick_recursive(tree, root);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId) -> String {
    let node = match tree.get_node(node_id) {
        Some(n) => n,
        None => return String::new(),
    };

    let mut s = String::new();
    if !node.children.is_empty() {
        let children: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child))
            .collect();
        s.push('(');
        s.push_str(&children.join(","));
        s.push(')');
    }
    if let Some(name) = &node.name {
        s.push_str(&quote_label(name));
    }
    if let Some(len) = node.length {
        s.push_str(&format!(":{}", len));
    }

    s
}

pub(crate) fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[] \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
