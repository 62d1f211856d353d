//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod run;

/// Twig - in-memory commit histories with chronological sync.
#[derive(Parser)]
#[command(name = "twig", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output; step results are still printed.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit debug logs on stderr (`RUST_LOG` overrides the filter).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "twig.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a session script against fresh in-memory repositories.
    ///
    /// One step per line: init, commit, drop, history, contains, head,
    /// size, sync, show. Blank lines and `#` comments are ignored.
    Run {
        /// Script file, or `-` to read from stdin.
        script: PathBuf,

        /// Print history steps as JSON.
        #[arg(long)]
        json: bool,

        /// Render dates in UTC regardless of configuration.
        #[arg(long)]
        utc: bool,

        /// Stamp commits deterministically, one second apart, starting at
        /// this many milliseconds since the Unix epoch.
        #[arg(long, value_name = "MILLIS")]
        epoch: Option<i64>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
