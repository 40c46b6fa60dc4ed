use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A nom error that keeps every context it passed through,
/// innermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// Recursive clade produced by the combinators, flattened into the arena afterwards.
#[derive(Debug, Default)]
struct Clade {
    name: Option<String>,
    length: Option<f64>,
    children: Vec<Clade>,
}

impl Clade {
    /// Appends this clade to `tree` in preorder and returns the id of its top node.
    fn into_tree(self, tree: &mut Tree) -> Result<NodeId, TreeError> {
        let id = tree.add_node();
        if let Some(node) = tree.get_node_mut(id) {
            node.name = self.name;
            node.length = self.length;
        }
        for child in self.children {
            let child_id = child.into_tree(tree)?;
            tree.add_child(id, child_id)?;
        }
        Ok(id)
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// Wraps a parser and eats surrounding whitespace
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// Bracketed comments carry no information the outgroup engine uses.
// `[&&NHX:S=human]` and `[100]` are consumed and dropped.
fn skip_comments(input: &str) -> IResult<&str, (), DetailedError<'_>> {
    map(
        many0(ws(delimited(char('['), take_while(|c| c != ']'), char(']')))),
        |_| (),
    )
    .parse(input)
}

// Unquoted labels stop at Newick structural characters; quoted labels may
// contain anything but their own quote, doubled quotes are unescaped.
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    let unquoted = map(take_while(|c: char| !"():;,[]".contains(c)), |s: &str| {
        s.trim().to_string()
    });
    let single_quoted = delimited(
        char('\''),
        map(recognize(many0(alt((is_not("'"), tag("''"))))), |s: &str| {
            s.replace("''", "'")
        }),
        char('\''),
    );
    let double_quoted = delimited(
        char('"'),
        map(recognize(many0(alt((is_not("\""), tag("\"\""))))), |s: &str| {
            s.replace("\"\"", "\"")
        }),
        char('"'),
    );

    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            // A ':' commits us to a number
            cut(map_res(
                recognize((
                    opt(char('-')),
                    digit1,
                    opt((char('.'), digit1)),
                    opt((
                        alt((char('e'), char('E'))),
                        opt(alt((char('+'), char('-')))),
                        digit1,
                    )),
                )),
                |s: &str| s.parse::<f64>(),
            )),
        ),
    )
    .parse(input)
}

// (child1,child2,...)Label[comment]:Length[comment]
fn parse_clade(input: &str) -> IResult<&str, Clade, DetailedError<'_>> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), parse_clade),
            ws(char(')')),
        )),
    )
    .parse(input)?;

    let (input, label) = opt(parse_label).parse(input)?;
    let (input, _) = skip_comments(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, _) = skip_comments(input)?;

    let clade = Clade {
        name: label.filter(|l| !l.is_empty()),
        length,
        children: children.unwrap_or_default(),
    };

    Ok((input, clade))
}

fn clade_to_tree(clade: Clade) -> Result<Tree, TreeError> {
    let mut tree = Tree::new();
    let root_id = clade.into_tree(&mut tree)?;
    tree.set_root(root_id);
    Ok(tree)
}

// ================================================================================================
// Entry Points
// ================================================================================================

/// Parses a single Newick tree terminated by ';'.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (ws(parse_clade), ws(char(';')));

    match parser.parse(input) {
        Ok((_, (clade, _))) => clade_to_tree(clade),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(incomplete()),
    }
}

/// Parses every tree in `input`. Top-level bracketed blocks between trees
/// (file headers and the like) are skipped.
pub fn parse_newick_multi(input: &str) -> Result<Vec<Tree>, TreeError> {
    let one_tree = map((ws(parse_clade), ws(char(';'))), |(clade, _)| Some(clade));
    let header = map(
        ws(delimited(char('['), take_while(|c| c != ']'), char(']'))),
        |_| None,
    );

    let mut parser = many1(alt((one_tree, header)));

    match parser.parse(input) {
        Ok((_, clades)) => clades.into_iter().flatten().map(clade_to_tree).collect(),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(incomplete()),
    }
}

fn incomplete() -> TreeError {
    TreeError::ParseError {
        message: "Incomplete input".to_string(),
        line: 0,
        column: 0,
        snippet: "".to_string(),
    }
}

// Locates the innermost failure and renders the context stack
fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    let remaining = e.errors.first().map(|(rest, _)| *rest).unwrap_or(input);
    let offset = input.offset(remaining);

    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut msg = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                msg.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                msg.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message: msg,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a Newick string into a Tree.
    ///
    /// # Example
    /// ```
    /// use ogsel::libs::phylo::Tree;
    ///
    /// let tree = Tree::from_newick("((A:1,B:1)X:1,C:1)root;").unwrap();
    /// assert_eq!(tree.len(), 5);
    ///
    /// let result = Tree::from_newick("(A,B:invalid)C;");
    /// assert!(result.is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }

    pub fn from_newick_multi(input: &str) -> Result<Vec<Self>, TreeError> {
        parse_newick_multi(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_simple() {
        let tree = Tree::from_newick("(A,B)C;").unwrap();
        assert_eq!(tree.len(), 3);

        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert_eq!(root.name.as_deref(), Some("C"));
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_parser_preorder_ids() {
        // ids follow preorder, the engine relies on it for tie breaking
        let tree = Tree::from_newick("((A:1,B:1)X:1,C:1)root;").unwrap();
        let names: Vec<&str> = (0..5).map(|i| tree.get_node(i).unwrap().label()).collect();
        assert_eq!(names, vec!["root", "X", "A", "B", "C"]);
        assert_eq!(tree.get_node(1).unwrap().length, Some(1.0));
        assert_eq!(tree.get_node(0).unwrap().length, None);
    }

    #[test]
    fn test_parser_lengths_and_comments() {
        let tree = Tree::from_newick("(A:0.1[&&NHX:S=a], B[100]:0.2e-1)Root:100;").unwrap();
        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert_eq!(root.length, Some(100.0));

        let b = tree.get_node(tree.get_node_by_name("B").unwrap()).unwrap();
        assert_eq!(b.length, Some(0.02));
    }

    #[test]
    fn test_parser_quoted() {
        let tree = Tree::from_newick("('Homo sapiens','O''Brien')root;").unwrap();
        assert!(tree.get_node_by_name("Homo sapiens").is_some());
        assert!(tree.get_node_by_name("O'Brien").is_some());
    }

    #[test]
    fn test_parser_multi() {
        let trees = Tree::from_newick_multi("[header]\n(A,B);\n((A,B),C);\n").unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].len(), 5);
    }

    #[test]
    fn test_parser_errors() {
        let err = Tree::from_newick("(A,B:x)C;").unwrap_err();
        match err {
            TreeError::ParseError { line, .. } => assert_eq!(line, 1),
            _ => panic!("expected a parse error"),
        }
        assert!(Tree::from_newick("(A,B)C").is_err());
    }
}
