mod bugzilla;
mod http;
mod jenkins;
mod jira;

use std::collections::HashMap;

use crate::blockers::TrackerId;
use crate::error::{JeevesError, Result};
use crate::report::{BuildStatus, Link};

pub use bugzilla::BugzillaClient;
pub use jenkins::{release_version, JenkinsClient};
pub use jira::JiraClient;

/// Looks up the last completed build of a job.
#[allow(async_fn_in_trait)]
pub trait BuildStatusResolver {
    /// Returns `None` when the status could not be determined; the job is
    /// then left out of every report.
    async fn resolve(&self, job_name: &str) -> Option<BuildStatus>;
}

/// Batch lookup against a bug or ticket tracker.
#[allow(async_fn_in_trait)]
pub trait RecordLookup {
    /// Resolves all `ids` in one request. IDs the tracker does not know are
    /// absent from the returned map.
    async fn resolve_many(&self, ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>>;
}

impl<L: RecordLookup> RecordLookup for Option<L> {
    async fn resolve_many(&self, ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>> {
        match self {
            Some(lookup) => lookup.resolve_many(ids).await,
            None => Err(JeevesError::Config("tracker is not configured".to_string())),
        }
    }
}
