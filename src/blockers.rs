use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::report::{Link, LookupOutcome};

/// Identifier in an external bug or ticket tracker.
///
/// Bugzilla IDs are usually written as bare numbers in the blocker file and
/// Jira keys as strings; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackerId(String);

impl TrackerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TrackerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Miscellaneous blocker that lives in neither tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherBlocker {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Static metadata for one monitored job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owners: Vec<String>,

    #[serde(default, rename = "bz", deserialize_with = "null_as_empty")]
    pub defect_ids: Vec<TrackerId>,

    #[serde(default, rename = "jira", deserialize_with = "null_as_empty")]
    pub ticket_ids: Vec<TrackerId>,

    #[serde(default, rename = "other", deserialize_with = "null_as_empty")]
    pub other_refs: Vec<OtherBlocker>,
}

impl BlockerEntry {
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owners.iter().any(|o| o == owner)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The blocker file: job name to metadata, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blockers {
    jobs: IndexMap<String, BlockerEntry>,
}

impl Blockers {
    /// Reads a YAML blocker file.
    ///
    /// A job listed with no body (`job-name:`) is treated as an entry with no
    /// owners and no blockers.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let blockers = Self::from_yaml_str(&contents)?;
        debug!("Loaded {} jobs from {}", blockers.len(), path.display());
        Ok(blockers)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let raw: Option<IndexMap<String, Option<BlockerEntry>>> = serde_yaml::from_str(contents)?;

        let jobs = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(name, entry)| (name, entry.unwrap_or_default()))
            .collect();

        Ok(Self { jobs })
    }

    pub fn get(&self, job_name: &str) -> Option<&BlockerEntry> {
        self.jobs.get(job_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlockerEntry)> {
        self.jobs.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Every distinct owner named by any job.
    pub fn owners(&self) -> BTreeSet<String> {
        self.jobs
            .values()
            .flat_map(|entry| entry.owners.iter().cloned())
            .collect()
    }

    /// Jobs listing `owner`, in file order.
    pub fn jobs_for_owner<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, entry)| entry.is_owned_by(owner))
            .map(|(name, _)| name)
    }

    /// Miscellaneous blockers recorded for a job.
    pub fn other_blockers(&self, job_name: &str) -> LookupOutcome {
        let Some(entry) = self.jobs.get(job_name) else {
            return LookupOutcome::LookupError(format!("unknown job: {job_name}"));
        };

        if entry.other_refs.is_empty() {
            return LookupOutcome::NotFound;
        }

        LookupOutcome::Found(
            entry
                .other_refs
                .iter()
                .map(|other| Link::new(other.name.clone(), other.url.clone()))
                .collect(),
        )
    }
}
