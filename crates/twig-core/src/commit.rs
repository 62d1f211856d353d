//! Commit records and their identifiers.
//!
//! A [`Commit`] is immutable apart from its link to the next-older commit,
//! and only the owning [`crate::Repository`] can touch that link.

use std::env;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::sequencer::Sequencer;

/// Owning link from a commit to the next-older one.
pub(crate) type Link = Option<Box<Commit>>;

/// `yyyy-MM-dd 'at' HH:mm:ss z`
const DATE_FORMAT: &str = "%Y-%m-%d at %H:%M:%S %Z";

/// Identifier assigned to a commit when it is created.
///
/// The decimal form of a [`Sequencer`] counter value: `"0"`, `"1"`, `"2"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the `CommitId` and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<u64> for CommitId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for CommitId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CommitId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CommitId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for CommitId {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

impl Serialize for CommitId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Time zone used when rendering commit dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    /// The machine's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// A single entry in a repository's history.
#[derive(Debug)]
pub struct Commit {
    id: CommitId,
    message: String,
    timestamp: i64,
    previous: Link,
}

impl Commit {
    /// Stamp a new commit with the sequencer's next id and current time.
    pub(crate) fn create(sequencer: &Sequencer, message: impl Into<String>, previous: Link) -> Self {
        Self {
            id: sequencer.next_id(),
            message: message.into(),
            timestamp: sequencer.now_millis(),
            previous,
        }
    }

    /// Unique identifier of this commit.
    #[must_use]
    pub const fn id(&self) -> &CommitId {
        &self.id
    }

    /// Message supplied when the commit was made.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Creation time as a UTC date, if it is representable.
    #[must_use]
    pub const fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// The next-older commit in the same chain.
    #[must_use]
    pub fn previous(&self) -> Option<&Self> {
        self.previous.as_deref()
    }

    pub(crate) const fn previous_mut(&mut self) -> &mut Link {
        &mut self.previous
    }

    /// Format the creation date as `YYYY-MM-DD at HH:MM:SS TZ`.
    ///
    /// Local dates carry the zone abbreviation (`PST`, `CET`, ...) when the
    /// machine's IANA zone is known, and the numeric offset otherwise.
    #[must_use]
    pub fn formatted_date(&self, zone: Zone) -> String {
        match (zone, local_zone()) {
            (Zone::Local, Some(tz)) => self.formatted_date_in(&tz),
            (Zone::Local, None) => self.formatted_date_in(&Local),
            (Zone::Utc, _) => self.formatted_date_in(&Utc),
        }
    }

    /// Format the creation date in an explicit time zone.
    #[must_use]
    pub fn formatted_date_in<T: TimeZone>(&self, tz: &T) -> String
    where
        T::Offset: fmt::Display,
    {
        self.created().map_or_else(
            || self.timestamp.to_string(),
            |created| created.with_timezone(tz).format(DATE_FORMAT).to_string(),
        )
    }

    /// Render as `"<id> at <date>: <message>"` in the given zone.
    #[must_use]
    pub fn render(&self, zone: Zone) -> String {
        format!("{} at {}: {}", self.id, self.formatted_date(zone), self.message)
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Zone::Local))
    }
}

/// The machine's IANA zone, looked up once. `TZ` takes precedence over the
/// system setting; a `TZ` that is not an IANA name yields `None`.
fn local_zone() -> Option<Tz> {
    static LOCAL: OnceLock<Option<Tz>> = OnceLock::new();
    *LOCAL.get_or_init(|| match env::var("TZ") {
        Ok(name) => zone_from_name(&name),
        Err(_) => iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| zone_from_name(&name)),
    })
}

/// Parse an IANA zone name, accepting the POSIX `:` prefix.
fn zone_from_name(name: &str) -> Option<Tz> {
    name.trim_start_matches(':').parse().ok()
}

// Unlink iteratively so that dropping a long chain does not recurse once per node.
impl Drop for Commit {
    fn drop(&mut self) {
        let mut link = self.previous.take();
        while let Some(mut node) = link {
            link = node.previous.take();
        }
    }
}

/// Serializable view of a commit, used for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub id: CommitId,
    pub message: String,
    pub timestamp: i64,
    pub date: String,
}

impl CommitSummary {
    /// Build a summary with the date rendered in `zone`.
    #[must_use]
    pub fn new(commit: &Commit, zone: Zone) -> Self {
        Self {
            id: commit.id.clone(),
            message: commit.message.clone(),
            timestamp: commit.timestamp,
            date: commit.formatted_date(zone),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;

    // 2023-11-14 22:13:20 UTC
    const NOV_14: i64 = 1_700_000_000_000;

    fn sequencer() -> Sequencer {
        Sequencer::with_clock(SteppingClock::new(NOV_14, 1_000))
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let seq = sequencer();
        let first = Commit::create(&seq, "first", None);
        let second = Commit::create(&seq, "second", None);

        assert_eq!(first.id(), "0");
        assert_eq!(second.id(), "1");
        assert_eq!(first.timestamp(), NOV_14);
        assert_eq!(second.timestamp(), NOV_14 + 1_000);
        assert_eq!(first.message(), "first");
        assert!(first.previous().is_none());
    }

    #[test]
    fn test_create_with_previous() {
        let seq = sequencer();
        let older = Commit::create(&seq, "older", None);
        let newer = Commit::create(&seq, "newer", Some(Box::new(older)));

        let previous = newer.previous().unwrap();
        assert_eq!(previous.id(), "0");
        assert_eq!(previous.message(), "older");
    }

    #[test]
    fn test_render_utc() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "Initial import", None);
        assert_eq!(
            commit.render(Zone::Utc),
            "0 at 2023-11-14 at 22:13:20 UTC: Initial import"
        );
    }

    #[test]
    fn test_render_uses_zone_abbreviation() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "m", None);

        assert_eq!(
            commit.formatted_date_in(&chrono_tz::America::Los_Angeles),
            "2023-11-14 at 14:13:20 PST"
        );
        assert_eq!(
            commit.formatted_date_in(&chrono_tz::Europe::Berlin),
            "2023-11-14 at 23:13:20 CET"
        );
        assert_eq!(
            commit.formatted_date_in(&chrono_tz::UTC),
            "2023-11-14 at 22:13:20 UTC"
        );
    }

    #[test]
    fn test_zone_from_name() {
        assert_eq!(
            zone_from_name("America/Los_Angeles"),
            Some(chrono_tz::America::Los_Angeles)
        );
        assert_eq!(zone_from_name(":Europe/Berlin"), Some(chrono_tz::Europe::Berlin));
        assert_eq!(zone_from_name("UTC"), Some(chrono_tz::UTC));
        assert_eq!(zone_from_name("not/a-zone"), None);
    }

    #[test]
    fn test_local_zone_matches_detected_zone() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "m", None);
        if let Some(tz) = local_zone() {
            assert_eq!(commit.formatted_date(Zone::Local), commit.formatted_date_in(&tz));
        }
    }

    #[test]
    fn test_display_uses_local_zone() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "hello", None);
        let expected = format!("0 at {}: hello", commit.formatted_date(Zone::Local));
        assert_eq!(commit.to_string(), expected);
        assert!(commit.to_string().starts_with("0 at "));
        assert!(commit.to_string().ends_with(": hello"));
    }

    #[test]
    fn test_empty_message_is_allowed() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "", None);
        assert!(commit.render(Zone::Utc).ends_with("UTC: "));
    }

    #[test]
    fn test_unrepresentable_timestamp_falls_back_to_millis() {
        let seq = Sequencer::with_clock(SteppingClock::new(i64::MAX, 0));
        let commit = Commit::create(&seq, "far future", None);
        assert_eq!(commit.formatted_date(Zone::Utc), i64::MAX.to_string());
    }

    #[test]
    fn test_drop_long_chain_does_not_overflow() {
        let seq = Sequencer::with_clock(SteppingClock::new(0, 1));
        let mut link: Link = None;
        for _ in 0..200_000 {
            link = Some(Box::new(Commit::create(&seq, "x", link)));
        }
        drop(link);
    }

    #[test]
    fn test_commit_id_comparisons() {
        let id = CommitId::from(42);
        assert_eq!(id, "42");
        assert_eq!(id, "42".to_string());
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.into_inner(), "42");
    }

    #[test]
    fn test_summary_serializes() {
        let seq = sequencer();
        let commit = Commit::create(&seq, "Add parser", None);
        let summary = CommitSummary::new(&commit, Zone::Utc);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["id"], "0");
        assert_eq!(json["message"], "Add parser");
        assert_eq!(json["timestamp"], NOV_14);
        assert_eq!(json["date"], "2023-11-14 at 22:13:20 UTC");
    }
}
