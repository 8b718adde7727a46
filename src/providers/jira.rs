use std::collections::HashMap;

use log::debug;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::blockers::TrackerId;
use crate::error::{JeevesError, Result};
use crate::report::Link;

use super::bugzilla::parse_base_url;
use super::http::HttpClient;
use super::RecordLookup;

/// Jira REST client resolving issue keys to their summaries.
pub struct JiraClient {
    http: HttpClient,
    base_url: Url,
    token: Option<Token>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: String,
}

impl JiraClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let base_url = parse_base_url(base_url)
            .map_err(|e| JeevesError::Config(format!("Invalid Jira URL: {e}")))?;

        Ok(Self {
            http: HttpClient::new()?,
            base_url,
            token,
        })
    }

    #[cfg(test)]
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    fn browse_url(&self, key: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["browse", key]);
        }
        url.to_string()
    }

    fn search_url(&self, ids: &[TrackerId]) -> Result<Url> {
        let mut url = self
            .base_url
            .join("rest/api/2/search")
            .map_err(|e| JeevesError::Config(format!("Invalid Jira URL: {e}")))?;

        let keys = ids
            .iter()
            .map(TrackerId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        url.query_pairs_mut()
            .append_pair("jql", &format!("key in ({keys})"))
            .append_pair("validateQuery", "warn")
            .append_pair("fields", "summary")
            .append_pair("maxResults", &ids.len().to_string());
        Ok(url)
    }
}

impl RecordLookup for JiraClient {
    async fn resolve_many(&self, ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>> {
        let url = self.search_url(ids)?;

        let response: SearchResponse = self
            .http
            .get_json(|client| {
                let request = client.get(url.clone());
                match &self.token {
                    Some(token) => request.bearer_auth(token.as_str()),
                    None => request,
                }
            })
            .await?;

        debug!("Jira returned {} of {} tickets", response.issues.len(), ids.len());

        // Jira answers with the canonical upper-case key; results are keyed
        // by the ID as it was requested.
        let mut by_key: HashMap<String, Link> = response
            .issues
            .into_iter()
            .map(|issue| {
                let link = Link::new(issue.fields.summary, Some(self.browse_url(&issue.key)));
                (issue.key.to_uppercase(), link)
            })
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| {
                let link = by_key.remove(&id.as_str().to_uppercase())?;
                Some((id.clone(), link))
            })
            .collect())
    }
}
