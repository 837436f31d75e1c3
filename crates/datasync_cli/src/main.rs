//! Datasync CLI
//!
//! Command-line host for the datasync reconciliation engine. Datasets are
//! JSON arrays of records; synchronizations are declared in a JSON
//! definitions file.
//!
//! # Commands
//!
//! - `diff` - Compare two dataset files
//! - `list` - List the synchronizations of a definitions file
//! - `run` - Run one or all synchronizations

mod commands;
mod dataset;
mod definitions;
mod error;

use clap::{Parser, Subcommand};
use commands::diff::OutputFormat;
use dataset::MergeMode;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Reconcile JSON datasets.
#[derive(Parser)]
#[command(name = "datasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two dataset files
    Diff {
        /// Authoritative dataset
        #[arg(short, long)]
        source: PathBuf,

        /// Dataset to bring in line with the source
        #[arg(short, long)]
        destination: PathBuf,

        /// Key field shared by both datasets
        #[arg(short, long)]
        key: String,

        /// How modified records are combined
        #[arg(short, long, value_enum, default_value = "source")]
        merge: MergeMode,

        /// Top-level fields excluded from comparison
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the synchronizations of a definitions file
    List {
        /// Definitions file
        #[arg(short, long)]
        definitions: PathBuf,
    },

    /// Run one or all synchronizations
    Run {
        /// Definitions file
        #[arg(short, long)]
        definitions: PathBuf,

        /// Run only this synchronization
        #[arg(short, long)]
        name: Option<String>,

        /// Rewrite destination files with the reconciled data
        #[arg(short, long)]
        apply: bool,

        /// Save even when nothing changed
        #[arg(long)]
        force: bool,

        /// Directory receiving <name>.delta.json reports
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run synchronizations concurrently
        #[arg(short, long)]
        parallel: bool,

        /// Per-run deadline in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Diff {
            source,
            destination,
            key,
            merge,
            ignore,
            format,
        } => {
            commands::diff::run(&source, &destination, &key, merge, &ignore, format)?;
        }
        Commands::List { definitions } => {
            commands::list::run(&definitions)?;
        }
        Commands::Run {
            definitions,
            name,
            apply,
            force,
            output,
            parallel,
            timeout,
        } => {
            let options = commands::run::RunOptions {
                name,
                apply,
                force,
                output,
                parallel,
                timeout: timeout.map(Duration::from_secs),
            };
            commands::run::run(&definitions, options)?;
        }
        Commands::Version => {
            println!("datasync v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff_args(format: &str) -> Vec<&str> {
        vec![
            "datasync", "diff", "-s", "a.json", "-d", "b.json", "-k", "id", "-f", format,
        ]
    }

    #[test]
    fn diff_format_is_validated() {
        let cli = Cli::try_parse_from(diff_args("json")).unwrap();
        match cli.command {
            Commands::Diff { format, merge, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(merge, MergeMode::Source);
            }
            _ => panic!("expected diff command"),
        }

        assert!(Cli::try_parse_from(diff_args("jsn")).is_err());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "datasync", "run", "-d", "sync.json", "--name", "users", "--apply", "--timeout", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                name, apply, timeout, parallel, ..
            } => {
                assert_eq!(name.as_deref(), Some("users"));
                assert!(apply);
                assert!(!parallel);
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("expected run command"),
        }
    }
}
