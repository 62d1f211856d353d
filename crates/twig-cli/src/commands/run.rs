//! `twig run` command - execute a session script.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use twig_core::{Config, Sequencer, SteppingClock, Zone};

use crate::output;
use crate::services::{Outcome, SessionService, parse_script};

/// Milliseconds between commits when `--epoch` is given.
const EPOCH_STEP_MS: i64 = 1_000;

/// Options for the run command.
pub struct RunOptions<'a> {
    pub script: &'a Path,
    pub config: &'a Path,
    pub json: bool,
    pub utc: bool,
    pub epoch: Option<i64>,
}

/// Run the run command.
pub fn run(opts: &RunOptions<'_>) -> Result<()> {
    let config = Config::load(opts.config)
        .with_context(|| format!("Failed to load config from {}", opts.config.display()))?;

    let text = read_script(opts.script)?;
    let steps = parse_script(&text)?;
    debug!(steps = steps.len(), script = %opts.script.display(), "parsed session script");

    let sequencer = opts.epoch.map_or_else(Sequencer::new, |start| {
        Sequencer::with_clock(SteppingClock::new(start, EPOCH_STEP_MS))
    });
    let mut session = SessionService::new(sequencer, &config);
    if opts.utc {
        session = session.with_zone(Zone::Utc);
    }

    for (line, step) in &steps {
        let outcome = session
            .apply(step)
            .with_context(|| format!("line {line}"))?;
        print_outcome(&outcome, opts.json)?;
    }

    Ok(())
}

/// Read the script from a file, or from stdin when the path is `-`.
fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return io::read_to_string(io::stdin()).context("Failed to read script from stdin");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read script {}", path.display()))
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<()> {
    match outcome {
        Outcome::Created { repo } => {
            output::success(&format!("Initialized repository {}", output::repo_name(repo)));
        }
        Outcome::Committed { repo, id } => {
            output::success(&format!(
                "Committed {} to {}",
                output::commit_id(id),
                output::repo_name(repo)
            ));
        }
        Outcome::Dropped { repo, id, removed } => {
            if *removed {
                output::success(&format!(
                    "Dropped {} from {}",
                    output::commit_id(id),
                    output::repo_name(repo)
                ));
            } else {
                output::warn(&format!("No commit {id} in {}", output::repo_name(repo)));
            }
        }
        Outcome::History {
            repo,
            text,
            commits,
        } => {
            if json {
                output::essential(&serde_json::to_string_pretty(commits)?);
            } else if commits.is_empty() {
                output::info(&format!("{} has no commits", output::repo_name(repo)));
            } else {
                output::essential(text);
            }
        }
        Outcome::Contains { found } => output::essential(&found.to_string()),
        Outcome::Head { head } => {
            output::essential(head.as_ref().map_or("none", |id| id.as_str()));
        }
        Outcome::Size { size } => output::essential(&size.to_string()),
        Outcome::Synced {
            dest,
            source,
            moved,
            size,
            head,
        } => {
            if *moved == 0 {
                output::info(&format!(
                    "Nothing to synchronize from {}",
                    output::repo_name(source)
                ));
            } else {
                output::success(&format!(
                    "Synchronized {moved} commit(s) from {} into {} ({size} total)",
                    output::repo_name(source),
                    output::repo_name(dest)
                ));
                if let Some(head) = head {
                    output::detail(&format!("  head is now {}", output::commit_id(head)));
                }
            }
        }
        Outcome::Show { summary } => output::essential(summary),
    }
    Ok(())
}
