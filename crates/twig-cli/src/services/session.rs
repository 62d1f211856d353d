//! Session service for running scripted steps against in-memory repositories.
//!
//! This module parses session scripts and applies each step to a set of named
//! repositories that share one [`Sequencer`], separated from CLI presentation
//! concerns. Nothing outlives the session.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use twig_core::{CommitId, CommitSummary, Config, Repository, Sequencer, Zone};

/// A single parsed line of a session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Init { repo: String },
    Commit { repo: String, message: String },
    Drop { repo: String, id: String },
    History { repo: String, count: Option<usize> },
    Contains { repo: String, id: String },
    Head { repo: String },
    Size { repo: String },
    Sync { dest: String, source: String },
    Show { repo: String },
}

impl Step {
    /// Parse one script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let step = match verb {
            "init" => Self::Init {
                repo: single(verb, rest)?,
            },
            "commit" => {
                let (repo, message) = split_word(rest);
                if repo.is_empty() {
                    bail!("usage: commit <repo> <message>");
                }
                Self::Commit {
                    repo: repo.to_string(),
                    message: unquote(message).to_string(),
                }
            }
            "drop" => {
                let (repo, id) = pair(verb, rest, "<repo> <id>")?;
                Self::Drop { repo, id }
            }
            "history" => {
                let (repo, count) = split_word(rest);
                if repo.is_empty() {
                    bail!("usage: history <repo> [n]");
                }
                let count = match count {
                    "" => None,
                    n => Some(
                        n.parse()
                            .with_context(|| format!("invalid commit count '{n}'"))?,
                    ),
                };
                Self::History {
                    repo: repo.to_string(),
                    count,
                }
            }
            "contains" => {
                let (repo, id) = pair(verb, rest, "<repo> <id>")?;
                Self::Contains { repo, id }
            }
            "head" => Self::Head {
                repo: single(verb, rest)?,
            },
            "size" => Self::Size {
                repo: single(verb, rest)?,
            },
            "sync" => {
                let (dest, source) = pair(verb, rest, "<dest> <source>")?;
                Self::Sync { dest, source }
            }
            "show" => Self::Show {
                repo: single(verb, rest)?,
            },
            other => bail!("unknown step '{other}'"),
        };

        Ok(Some(step))
    }
}

/// Parse a whole script, keeping 1-based line numbers for error reporting.
pub fn parse_script(script: &str) -> Result<Vec<(usize, Step)>> {
    let mut steps = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let number = index + 1;
        if let Some(step) = Step::parse(line).with_context(|| format!("line {number}"))? {
            steps.push((number, step));
        }
    }
    Ok(steps)
}

/// What a step produced, for the command layer to print.
#[derive(Debug, Clone)]
pub enum Outcome {
    Created {
        repo: String,
    },
    Committed {
        repo: String,
        id: CommitId,
    },
    Dropped {
        repo: String,
        id: String,
        removed: bool,
    },
    History {
        repo: String,
        text: String,
        commits: Vec<CommitSummary>,
    },
    Contains {
        found: bool,
    },
    Head {
        head: Option<CommitId>,
    },
    Size {
        size: usize,
    },
    Synced {
        dest: String,
        source: String,
        moved: usize,
        size: usize,
        head: Option<CommitId>,
    },
    Show {
        summary: String,
    },
}

/// Service holding the repositories of one session.
pub struct SessionService {
    sequencer: Sequencer,
    repos: BTreeMap<String, Repository>,
    zone: Zone,
    default_count: usize,
}

impl SessionService {
    /// Create a session whose commits are stamped by `sequencer`.
    pub const fn new(sequencer: Sequencer, config: &Config) -> Self {
        Self {
            sequencer,
            repos: BTreeMap::new(),
            zone: config.zone(),
            default_count: config.history.default_count,
        }
    }

    /// Override the zone dates are rendered in.
    #[must_use]
    pub const fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    /// Look up a repository by name.
    #[cfg(test)]
    pub fn repository(&self, name: &str) -> Option<&Repository> {
        self.repos.get(name)
    }

    /// Apply a single step.
    pub fn apply(&mut self, step: &Step) -> Result<Outcome> {
        let outcome = match step {
            Step::Init { repo } => {
                if self.repos.contains_key(repo) {
                    bail!("repository '{repo}' already exists");
                }
                let created = Repository::new(repo.clone(), self.sequencer.clone())?;
                self.repos.insert(repo.clone(), created);
                Outcome::Created { repo: repo.clone() }
            }
            Step::Commit { repo, message } => Outcome::Committed {
                repo: repo.clone(),
                id: self.get_mut(repo)?.commit(message.clone()),
            },
            Step::Drop { repo, id } => Outcome::Dropped {
                repo: repo.clone(),
                id: id.clone(),
                removed: self.get_mut(repo)?.drop(id),
            },
            Step::History { repo, count } => {
                let count = count.unwrap_or(self.default_count);
                let target = self.get(repo)?;
                Outcome::History {
                    repo: repo.clone(),
                    text: target.history_in(count, self.zone)?,
                    commits: target.summaries(count, self.zone)?,
                }
            }
            Step::Contains { repo, id } => Outcome::Contains {
                found: self.get(repo)?.contains(id),
            },
            Step::Head { repo } => Outcome::Head {
                head: self.get(repo)?.head().cloned(),
            },
            Step::Size { repo } => Outcome::Size {
                size: self.get(repo)?.size(),
            },
            Step::Sync { dest, source } => self.synchronize(dest, source)?,
            Step::Show { repo } => Outcome::Show {
                summary: self.get(repo)?.describe(self.zone),
            },
        };
        Ok(outcome)
    }

    fn synchronize(&mut self, dest: &str, source: &str) -> Result<Outcome> {
        if dest == source {
            bail!("cannot synchronize repository '{dest}' with itself");
        }
        let mut from = self
            .repos
            .remove(source)
            .ok_or_else(|| anyhow!("no repository named '{source}'"))?;
        let moved = from.size();

        let merged = self.get_mut(dest).map(|into| {
            into.synchronize(&mut from);
            (into.size(), into.head().cloned())
        });
        self.repos.insert(source.to_string(), from);
        let (size, head) = merged?;

        Ok(Outcome::Synced {
            dest: dest.to_string(),
            source: source.to_string(),
            moved,
            size,
            head,
        })
    }

    fn get(&self, name: &str) -> Result<&Repository> {
        self.repos
            .get(name)
            .ok_or_else(|| anyhow!("no repository named '{name}'"))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Repository> {
        self.repos
            .get_mut(name)
            .ok_or_else(|| anyhow!("no repository named '{name}'"))
    }
}

/// Split off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn single(verb: &str, rest: &str) -> Result<String> {
    let (name, extra) = split_word(rest);
    if name.is_empty() || !extra.is_empty() {
        bail!("usage: {verb} <repo>");
    }
    Ok(name.to_string())
}

fn pair(verb: &str, rest: &str, usage: &str) -> Result<(String, String)> {
    let (first, tail) = split_word(rest);
    let (second, extra) = split_word(tail);
    if first.is_empty() || second.is_empty() || !extra.is_empty() {
        bail!("usage: {verb} {usage}");
    }
    Ok((first.to_string(), second.to_string()))
}

/// Strip one pair of surrounding double quotes.
fn unquote(message: &str) -> &str {
    message
        .strip_prefix('"')
        .and_then(|m| m.strip_suffix('"'))
        .unwrap_or(message)
}
