//! # twig-core
//!
//! In-memory commit history for Twig. A [`Repository`] owns a singly-linked,
//! most-recent-first chain of [`Commit`] records and can absorb another
//! repository's chain in chronological order with [`Repository::synchronize`].

pub mod clock;
pub mod commit;
pub mod config;
mod error;
pub mod repository;
pub mod sequencer;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use commit::{Commit, CommitId, CommitSummary, Zone};
pub use config::Config;
pub use error::{Error, Result};
pub use repository::{Commits, Repository};
pub use sequencer::Sequencer;
