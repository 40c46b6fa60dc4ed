use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum OutgroupError {
    /// Malformed topology or names: no root, detached nodes, unnamed or
    /// duplicated names, a node to splice out without a parent
    InvalidTree(String),
    /// A genome's sequence source could not be read, or a leaf has no statistics
    MissingSequenceData { name: String, path: String },
    /// A re-run computed a different distance for an existing assignment.
    /// The tree changed between runs.
    InconsistentDistance {
        ancestor: String,
        outgroup: String,
        stored: f64,
        computed: f64,
    },
    /// A restored assignment names unknown nodes or closes a cycle
    InvalidAssignment(String),
}

impl fmt::Display for OutgroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutgroupError::InvalidTree(msg) => write!(f, "Invalid tree: {}", msg),
            OutgroupError::MissingSequenceData { name, path } => {
                write!(f, "Unable to read sequences of {} from {}", name, path)
            }
            OutgroupError::InconsistentDistance {
                ancestor,
                outgroup,
                stored,
                computed,
            } => write!(
                f,
                "Outgroup {} of {} was assigned at distance {}, now computed as {}",
                outgroup, ancestor, stored, computed
            ),
            OutgroupError::InvalidAssignment(msg) => write!(f, "Invalid assignment: {}", msg),
        }
    }
}

impl std::error::Error for OutgroupError {}
