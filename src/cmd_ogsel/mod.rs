//! Subcommand modules for the `ogsel` binary.

pub mod dynamic;
pub mod greedy;
pub mod label;
pub mod seqstat;
pub mod utils;
