use std::collections::HashMap;

use log::debug;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::blockers::TrackerId;
use crate::error::{JeevesError, Result};
use crate::report::Link;

use super::http::HttpClient;
use super::RecordLookup;

/// Bugzilla REST client resolving bug IDs to their summaries.
pub struct BugzillaClient {
    http: HttpClient,
    base_url: Url,
    api_key: Option<Token>,
}

#[derive(Debug, Deserialize)]
struct BugsResponse {
    #[serde(default)]
    bugs: Vec<Bug>,
}

#[derive(Debug, Deserialize)]
struct Bug {
    id: u64,
    summary: String,
}

impl BugzillaClient {
    pub fn new(base_url: &str, api_key: Option<Token>) -> Result<Self> {
        let base_url = parse_base_url(base_url)
            .map_err(|e| JeevesError::Config(format!("Invalid Bugzilla URL: {e}")))?;

        Ok(Self {
            http: HttpClient::new()?,
            base_url,
            api_key,
        })
    }

    #[cfg(test)]
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    fn bug_url(&self, id: u64) -> String {
        let mut url = self
            .base_url
            .join("show_bug.cgi")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut().append_pair("id", &id.to_string());
        url.to_string()
    }

    fn search_url(&self, ids: &[TrackerId]) -> Result<Url> {
        let mut url = self
            .base_url
            .join("rest/bug")
            .map_err(|e| JeevesError::Config(format!("Invalid Bugzilla URL: {e}")))?;

        let id_list = ids
            .iter()
            .map(TrackerId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        url.query_pairs_mut()
            .append_pair("id", &id_list)
            .append_pair("include_fields", "id,summary")
            .append_pair("permissive", "1");
        Ok(url)
    }
}

impl RecordLookup for BugzillaClient {
    async fn resolve_many(&self, ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>> {
        let url = self.search_url(ids)?;

        let response: BugsResponse = self
            .http
            .get_json(|client| {
                let request = client.get(url.clone());
                match &self.api_key {
                    Some(key) => request.header("X-BUGZILLA-API-KEY", key.as_str()),
                    None => request,
                }
            })
            .await?;

        debug!("Bugzilla returned {} of {} bugs", response.bugs.len(), ids.len());

        Ok(response
            .bugs
            .into_iter()
            .map(|bug| {
                let link = Link::new(bug.summary, Some(self.bug_url(bug.id)));
                (TrackerId::from(bug.id.to_string().as_str()), link)
            })
            .collect())
    }
}

/// Parses a tracker base URL so that relative joins land beneath it.
pub(super) fn parse_base_url(raw: &str) -> std::result::Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}
