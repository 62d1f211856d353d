//! Twig CLI - scripted sessions over in-memory commit histories.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;
mod services;

use commands::run::RunOptions;
use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_quiet(cli.quiet);

    let result = match &cli.command {
        Commands::Run {
            script,
            json,
            utc,
            epoch,
        } => commands::run::run(&RunOptions {
            script,
            config: &cli.config,
            json: *json,
            utc: *utc,
            epoch: *epoch,
        }),
        Commands::Completions { shell } => commands::completions::run(*shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "twig_core=debug,twig_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
