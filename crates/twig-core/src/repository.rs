//! Repository: a named, most-recent-first chain of commits.
//!
//! The repository exclusively owns its chain. Commits move between
//! repositories only through [`Repository::synchronize`], which relinks the
//! existing records instead of copying them.

use std::fmt;
use std::mem;

use tracing::debug;

use crate::commit::{Commit, CommitId, CommitSummary, Link, Zone};
use crate::error::{Error, Result};
use crate::sequencer::Sequencer;

/// A named history of commits.
#[derive(Debug)]
pub struct Repository {
    name: String,
    head: Link,
    size: usize,
    sequencer: Sequencer,
}

impl Repository {
    /// Create an empty repository.
    ///
    /// Commits are stamped by `sequencer`; repositories that should never
    /// hand out the same id must share it (or a clone of it).
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    pub fn new(name: impl Into<String>, sequencer: Sequencer) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid("repository name cannot be empty"));
        }
        Ok(Self {
            name,
            head: None,
            size: 0,
            sequencer,
        })
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the most recent commit, or `None` if the repository is empty.
    #[must_use]
    pub fn head(&self) -> Option<&CommitId> {
        self.head.as_deref().map(Commit::id)
    }

    /// The most recent commit.
    #[must_use]
    pub fn head_commit(&self) -> Option<&Commit> {
        self.head.as_deref()
    }

    /// Number of commits in the repository.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Check if the repository has no commits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Walk the chain from the head, most recent first.
    #[must_use]
    pub fn iter(&self) -> Commits<'_> {
        Commits {
            next: self.head.as_deref(),
        }
    }

    /// Check if a commit with `target` as id is in this repository.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.iter().any(|commit| commit.id() == target)
    }

    /// Record a new commit on top of the current head and return its id.
    pub fn commit(&mut self, message: impl Into<String>) -> CommitId {
        let commit = Commit::create(&self.sequencer, message, self.head.take());
        let id = commit.id().clone();
        self.head = Some(Box::new(commit));
        self.size += 1;
        debug!(repo = %self.name, id = %id, size = self.size, "committed");
        id
    }

    /// Remove the commit with `target` as id, keeping the order of the rest.
    ///
    /// Returns `false` if no such commit exists.
    pub fn drop(&mut self, target: &str) -> bool {
        let mut cursor = &mut self.head;
        loop {
            match cursor {
                None => return false,
                Some(node) if node.id() == target => {
                    *cursor = node.previous_mut().take();
                    self.size -= 1;
                    debug!(repo = %self.name, id = target, size = self.size, "dropped commit");
                    return true;
                }
                Some(node) => cursor = node.previous_mut(),
            }
        }
    }

    /// The `n` most recent commits, one formatted commit per line.
    ///
    /// Fewer lines are returned if the repository holds fewer than `n` commits.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `n` is zero.
    pub fn history(&self, n: usize) -> Result<String> {
        self.history_in(n, Zone::Local)
    }

    /// Same as [`Self::history`], rendering dates in `zone`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `n` is zero.
    pub fn history_in(&self, n: usize, zone: Zone) -> Result<String> {
        ensure_positive(n)?;
        let lines: Vec<String> = self.iter().take(n).map(|c| c.render(zone)).collect();
        Ok(lines.join("\n"))
    }

    /// Serializable summaries of the `n` most recent commits.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `n` is zero.
    pub fn summaries(&self, n: usize, zone: Zone) -> Result<Vec<CommitSummary>> {
        ensure_positive(n)?;
        Ok(self
            .iter()
            .take(n)
            .map(|c| CommitSummary::new(c, zone))
            .collect())
    }

    /// One-line description: the name plus the head commit, if any.
    #[must_use]
    pub fn describe(&self, zone: Zone) -> String {
        self.head_commit().map_or_else(
            || format!("{} - No commits", self.name),
            |head| format!("{} - Current head: {}", self.name, head.render(zone)),
        )
    }

    /// Merge `other`'s commits into this repository in chronological order,
    /// leaving `other` empty.
    ///
    /// The newer commit of the two chain fronts is taken first. On equal
    /// timestamps this repository's commit goes first.
    pub fn synchronize(&mut self, other: &mut Self) {
        let Some(theirs) = other.head.take() else {
            debug!(repo = %self.name, source = %other.name, "nothing to synchronize");
            return;
        };
        let their_size = mem::take(&mut other.size);

        if self.head.is_none() {
            self.head = Some(theirs);
            self.size = their_size;
        } else {
            self.head = merge_chains(self.head.take(), Some(theirs));
            self.size = self.iter().count();
        }

        debug!(
            repo = %self.name,
            source = %other.name,
            moved = their_size,
            size = self.size,
            "synchronized"
        );
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(Zone::Local))
    }
}

impl<'a> IntoIterator for &'a Repository {
    type Item = &'a Commit;
    type IntoIter = Commits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a repository's commits, most recent first.
#[derive(Debug, Clone)]
pub struct Commits<'a> {
    next: Option<&'a Commit>,
}

impl<'a> Iterator for Commits<'a> {
    type Item = &'a Commit;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous();
        Some(current)
    }
}

fn ensure_positive(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::invalid("number of commits to retrieve must be positive"));
    }
    Ok(())
}

/// Merge two newest-first chains into one newest-first chain.
///
/// Nodes are moved, never copied. Ties go to `ours`.
fn merge_chains(mut ours: Link, mut theirs: Link) -> Link {
    let mut merged: Link = None;
    let mut tail = &mut merged;

    loop {
        let take_ours = match (ours.as_deref(), theirs.as_deref()) {
            (Some(a), Some(b)) => a.timestamp() >= b.timestamp(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let source = if take_ours { &mut ours } else { &mut theirs };
        let Some(mut node) = source.take() else {
            break;
        };
        *source = node.previous_mut().take();
        tail = tail.insert(node).previous_mut();
    }

    merged
}
