use serde::Deserialize;

/// Subset of `/job/{name}/api/json` requested through the `tree` parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsJob {
    pub url: String,
    pub last_completed_build: Option<JenkinsBuild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JenkinsBuild {
    pub number: u64,
    pub url: String,
    /// Null while a build is still running.
    pub result: Option<String>,
}

pub(super) const JOB_TREE: &str = "url,lastCompletedBuild[number,url,result]";

/// Artifact the deployment jobs archive with the compose they installed.
pub(super) const COMPOSE_ARTIFACT: &str = "artifact/core_puddle_version";

pub(super) const MISSING_COMPOSE: &str = "Could not find compose";
