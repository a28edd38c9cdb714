//! Terminology server client.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use termset_core::error::AppError;
use termset_core::result::AppResult;

use crate::http::{ACTING_USER_HEADER, check_status, read_json, transport_error};
use crate::traits::{ConceptIdStream, TerminologyClient};

/// Branch metadata key prefix mapping a refset id to its language code.
pub const TRANSLATION_LANGUAGE_METADATA_PREFIX: &str = "translationLanguage.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeSystemResponse {
    branch_path: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    total: Option<u64>,
    search_after: Option<String>,
}

/// reqwest client for a terminology server.
#[derive(Debug, Clone)]
pub struct HttpTerminologyClient {
    http: reqwest::Client,
    base_url: String,
    acting_user: String,
    page_size: u32,
}

impl HttpTerminologyClient {
    /// Client against `base_url` acting for `acting_user`.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        acting_user: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            acting_user: acting_user.into(),
            page_size,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, what: &str) -> AppResult<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(ACTING_USER_HEADER, &self.acting_user)
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("{what}: not found")));
        }
        let response = check_status(response, what).await?;
        read_json(response, what).await
    }
}

/// Extract refset → language code pairs from branch metadata.
fn languages_from_metadata(metadata: &HashMap<String, serde_json::Value>) -> HashMap<String, String> {
    metadata
        .iter()
        .filter_map(|(key, value)| {
            let refset = key.strip_prefix(TRANSLATION_LANGUAGE_METADATA_PREFIX)?;
            let language = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((refset.to_string(), language))
        })
        .collect()
}

#[async_trait]
impl TerminologyClient for HttpTerminologyClient {
    async fn branch_for_codesystem(&self, codesystem: &str) -> AppResult<String> {
        let cs: CodeSystemResponse = self
            .get_json(
                &format!("/codesystems/{codesystem}"),
                &format!("Code system lookup {codesystem}"),
            )
            .await?;
        Ok(cs.branch_path)
    }

    async fn translation_languages(&self, codesystem: &str) -> AppResult<HashMap<String, String>> {
        let branch = self.branch_for_codesystem(codesystem).await?;
        let response: BranchResponse = self
            .get_json(&format!("/branches/{branch}"), &format!("Branch lookup {branch}"))
            .await?;
        Ok(languages_from_metadata(&response.metadata))
    }

    async fn stream_matching_ids(
        &self,
        branch: &str,
        query: &str,
    ) -> AppResult<Box<dyn ConceptIdStream>> {
        Ok(Box::new(HttpConceptIdStream {
            client: self.clone(),
            url: format!("{}/{}/concepts", self.base_url, branch),
            query: query.to_string(),
            buffer: VecDeque::new(),
            search_after: None,
            total: None,
            exhausted: false,
        }))
    }
}

/// Concept id stream paging with `searchAfter` tokens.
struct HttpConceptIdStream {
    client: HttpTerminologyClient,
    url: String,
    query: String,
    buffer: VecDeque<String>,
    search_after: Option<String>,
    total: Option<u64>,
    exhausted: bool,
}

impl HttpConceptIdStream {
    async fn fetch_page(&mut self) -> AppResult<()> {
        let mut params = vec![
            ("ecl", self.query.clone()),
            ("limit", self.client.page_size.to_string()),
            ("returnIdOnly", "true".to_string()),
        ];
        if let Some(token) = &self.search_after {
            params.push(("searchAfter", token.clone()));
        }

        let response = self
            .client
            .http
            .get(&self.url)
            .header(ACTING_USER_HEADER, &self.client.acting_user)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error("Concept search", e))?;
        let response = check_status(response, "Concept search").await?;
        let page: IdPage = read_json(response, "Concept search").await?;

        if page.total.is_some() {
            self.total = page.total;
        }
        if page.items.is_empty() || page.search_after.is_none() {
            self.exhausted = true;
        }
        self.search_after = page.search_after;
        debug!("Fetched {} concept ids", page.items.len());
        self.buffer.extend(page.items.into_iter().map(|item| match item {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }));
        Ok(())
    }
}

#[async_trait]
impl ConceptIdStream for HttpConceptIdStream {
    async fn next_id(&mut self) -> AppResult<Option<String>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }
        Ok(self.buffer.pop_front())
    }

    fn total(&self) -> Option<u64> {
        self.total
    }
}
