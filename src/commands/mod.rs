mod graph;
mod validate;

pub use graph::graph_command;
pub use validate::validate_command;

/// How validation results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per violation on stderr
    Text,
    /// JSON array of violation records on stdout
    Json,
}
