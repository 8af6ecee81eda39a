use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{OutputFormat, graph_command, validate_command};

#[derive(Parser)]
#[command(
    name = "devfile-lint",
    about = "A CLI tool that checks devfiles for structural consistency",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format for validation results
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        global = true,
        env = "DEVFILE_LINT_FORMAT"
    )]
    format: OutputFormat,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a devfile (default command)
    Validate {
        /// Devfile, or a directory containing one
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Draw composite commands and their sub-commands as a graph
    Graph {
        /// Devfile, or a directory containing one
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write to a file instead of stdout (.dot, or any Graphviz image format)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the order commands run in instead of the graph
        #[arg(long, conflicts_with = "output")]
        order: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Validate { path }) => {
            validate_command(&path, cli.format)?;
        }
        Some(Commands::Graph {
            path,
            output,
            order,
        }) => {
            graph_command(&path, output.as_deref(), order)?;
        }
        None => {
            // Default to validating the current directory
            validate_command(&PathBuf::from("."), cli.format)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("devfile_lint=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("devfile_lint=info"), // -v: info messages
        _ => EnvFilter::new("devfile_lint=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
