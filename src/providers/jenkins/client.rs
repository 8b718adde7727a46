use log::{debug, warn};
use reqwest::RequestBuilder;
use url::Url;

use crate::auth::Token;
use crate::error::{JeevesError, Result};
use crate::providers::http::HttpClient;
use crate::providers::BuildStatusResolver;
use crate::report::{BuildResult, BuildStatus};

use super::types::{JenkinsJob, COMPOSE_ARTIFACT, JOB_TREE, MISSING_COMPOSE};

/// Jenkins JSON API client used to resolve the status of monitored jobs.
pub struct JenkinsClient {
    http: HttpClient,
    base_url: Url,
    user: Option<String>,
    token: Option<Token>,
}

impl JenkinsClient {
    /// Creates a client for the Jenkins instance at `base_url`.
    ///
    /// `user` and `token` are sent as HTTP basic auth when both are set.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, user: Option<String>, token: Option<Token>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JeevesError::Config(format!("Invalid Jenkins URL: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(JeevesError::Config(format!(
                "Invalid Jenkins URL: {base_url}"
            )));
        }

        Ok(Self {
            http: HttpClient::new()?,
            base_url,
            user,
            token,
        })
    }

    #[cfg(test)]
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => request.basic_auth(user, Some(token.as_str())),
            _ => request,
        }
    }

    /// Jobs inside folders (`folder/job`) live at `job/folder/job/job`.
    fn job_api_url(&self, job_name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                JeevesError::Config(format!("Invalid Jenkins URL: {}", self.base_url))
            })?;
            segments.pop_if_empty();
            for part in job_name.split('/').filter(|part| !part.is_empty()) {
                segments.extend(["job", part]);
            }
            segments.extend(["api", "json"]);
        }
        url.query_pairs_mut().append_pair("tree", JOB_TREE);
        Ok(url)
    }

    async fn fetch_job(&self, job_name: &str) -> Result<JenkinsJob> {
        let url = self.job_api_url(job_name)?;
        self.http
            .get_json(|client| self.auth_request(client.get(url.clone())))
            .await
    }

    /// Reads the compose label archived by the build, if there is one.
    async fn fetch_compose(&self, build_url: &str) -> String {
        let url = match Url::parse(build_url).and_then(|u| u.join(COMPOSE_ARTIFACT)) {
            Ok(url) => url,
            Err(e) => {
                debug!("Cannot build compose URL from {build_url}: {e}");
                return MISSING_COMPOSE.to_string();
            }
        };

        let response = self
            .http
            .send(|client| self.auth_request(client.get(url.clone())))
            .await;

        let text = match response {
            Ok(response) => response.text().await.ok(),
            Err(e) => {
                debug!("No compose artifact at {url}: {e}");
                None
            }
        };

        text.map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| MISSING_COMPOSE.to_string())
    }

    /// Fetches the last completed build of `job_name`.
    ///
    /// Returns `Ok(None)` for a job that has never completed a build.
    pub async fn job_status(&self, job_name: &str) -> Result<Option<BuildStatus>> {
        let job = self.fetch_job(job_name).await?;

        let Some(build) = job.last_completed_build else {
            debug!("Job {job_name} has no completed builds");
            return Ok(None);
        };

        let result = BuildResult::from_jenkins(build.result.as_deref());
        let compose = self.fetch_compose(&build.url).await;

        Ok(Some(BuildStatus {
            result,
            build_number: build.number,
            build_url: build.url,
            job_url: job.url,
            compose,
        }))
    }
}

impl BuildStatusResolver for JenkinsClient {
    async fn resolve(&self, job_name: &str) -> Option<BuildStatus> {
        match self.job_status(job_name).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Unable to get Jenkins info for job {job_name}: {e}");
                None
            }
        }
    }
}
