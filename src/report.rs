use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::blockers::TrackerId;

/// Result of the last completed build of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    Unknown,
}

impl BuildResult {
    /// Maps a Jenkins `result` field onto the tracked states.
    ///
    /// Anything other than SUCCESS, UNSTABLE or FAILURE (ABORTED, NOT_BUILT,
    /// a build still running) is `Unknown`.
    pub fn from_jenkins(result: Option<&str>) -> Self {
        match result {
            Some("SUCCESS") => Self::Success,
            Some("UNSTABLE") => Self::Unstable,
            Some("FAILURE") => Self::Failure,
            _ => Self::Unknown,
        }
    }

    /// Only UNSTABLE and FAILURE builds are reported to owners.
    pub fn is_failing(self) -> bool {
        matches!(self, Self::Unstable | Self::Failure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved state of one monitored job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub result: BuildResult,
    pub build_number: u64,
    pub build_url: String,
    pub job_url: String,
    pub compose: String,
}

impl BuildStatus {
    pub fn is_failing(&self) -> bool {
        self.result.is_failing()
    }
}

/// A named reference shown in a report cell, optionally clickable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// The three kinds of correlation data attached to a failing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Bug,
    Ticket,
    Other,
}

impl RecordKind {
    /// Word used in the placeholder text; free-form blockers read as
    /// "blocker", never "N/A".
    pub fn noun(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Ticket => "ticket",
            Self::Other => "blocker",
        }
    }

    /// Entry substituted when nothing could be correlated for this kind.
    pub fn placeholder(self) -> Link {
        Link::new(format!("Could not find relevant {}", self.noun()), None)
    }
}

/// Outcome of correlating one kind of record for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Vec<Link>),
    NotFound,
    LookupError(String),
}

impl LookupOutcome {
    /// Walks `ids` in the caller's order and keeps the ones present in `found`.
    pub fn from_ids(ids: &[TrackerId], found: &HashMap<TrackerId, Link>) -> Self {
        let links: Vec<Link> = ids.iter().filter_map(|id| found.get(id).cloned()).collect();

        if links.is_empty() {
            Self::NotFound
        } else {
            Self::Found(links)
        }
    }

    /// Never returns an empty list.
    pub fn into_links(self, kind: RecordKind) -> Vec<Link> {
        match self {
            Self::Found(links) if !links.is_empty() => links,
            _ => vec![kind.placeholder()],
        }
    }
}

/// One line of a reminder: a failing job and everything known to block it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelatedRow {
    pub osp_version: String,
    pub job_name: String,
    pub job_url: String,
    pub build_number: u64,
    pub build_url: String,
    pub compose: String,
    pub result: BuildResult,
    pub bugs: Vec<Link>,
    pub tickets: Vec<Link>,
    pub other: Vec<Link>,
}

/// Everything one owner is told about in a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReport {
    pub owner: String,
    pub rows: Vec<CorrelatedRow>,
}

impl OwnerReport {
    /// An owner with no failing jobs gets no email.
    pub fn is_clear(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Report-wide values passed to the renderer alongside the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    pub from_address: String,
    pub from_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<TrackerId> {
        raw.iter().map(|id| TrackerId::from(*id)).collect()
    }

    #[test]
    fn test_from_jenkins_result() {
        assert_eq!(BuildResult::from_jenkins(Some("SUCCESS")), BuildResult::Success);
        assert_eq!(BuildResult::from_jenkins(Some("UNSTABLE")), BuildResult::Unstable);
        assert_eq!(BuildResult::from_jenkins(Some("FAILURE")), BuildResult::Failure);
        assert_eq!(BuildResult::from_jenkins(Some("ABORTED")), BuildResult::Unknown);
        assert_eq!(BuildResult::from_jenkins(None), BuildResult::Unknown);
    }

    #[test]
    fn test_only_unstable_and_failure_are_failing() {
        assert!(BuildResult::Unstable.is_failing());
        assert!(BuildResult::Failure.is_failing());
        assert!(!BuildResult::Success.is_failing());
        assert!(!BuildResult::Unknown.is_failing());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            RecordKind::Bug.placeholder(),
            Link::new("Could not find relevant bug", None)
        );
        assert_eq!(
            RecordKind::Ticket.placeholder(),
            Link::new("Could not find relevant ticket", None)
        );
        assert_eq!(
            RecordKind::Other.placeholder(),
            Link::new("Could not find relevant blocker", None)
        );
    }

    #[test]
    fn test_from_ids_preserves_caller_order() {
        let found = HashMap::from([
            (TrackerId::from("2"), Link::new("second", None)),
            (TrackerId::from("1"), Link::new("first", None)),
        ]);

        let outcome = LookupOutcome::from_ids(&ids(&["2", "1"]), &found);
        assert_eq!(
            outcome,
            LookupOutcome::Found(vec![Link::new("second", None), Link::new("first", None)])
        );
    }

    #[test]
    fn test_from_ids_skips_missing_ids() {
        let found = HashMap::from([(TrackerId::from("7"), Link::new("seven", None))]);

        let outcome = LookupOutcome::from_ids(&ids(&["6", "7", "8"]), &found);
        assert_eq!(outcome, LookupOutcome::Found(vec![Link::new("seven", None)]));
    }

    #[test]
    fn test_from_ids_with_nothing_found() {
        let outcome = LookupOutcome::from_ids(&ids(&["6"]), &HashMap::new());
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[test]
    fn test_into_links_substitutes_placeholder() {
        assert_eq!(
            LookupOutcome::NotFound.into_links(RecordKind::Bug),
            vec![RecordKind::Bug.placeholder()]
        );
        assert_eq!(
            LookupOutcome::LookupError("boom".into()).into_links(RecordKind::Ticket),
            vec![RecordKind::Ticket.placeholder()]
        );
        assert_eq!(
            LookupOutcome::Found(vec![]).into_links(RecordKind::Other),
            vec![RecordKind::Other.placeholder()]
        );
    }
}
