//! Client factory backed by a shared reqwest connection pool.

use std::sync::Arc;
use std::time::Duration;

use termset_core::config::{LlmConfig, PlatformConfig, TerminologyConfig};
use termset_core::error::{AppError, ErrorKind};
use termset_core::result::AppResult;

use crate::llm::HttpLlmClient;
use crate::platform::HttpPlatformClient;
use crate::terminology::HttpTerminologyClient;
use crate::traits::{ClientFactory, LlmClient, TerminologyClient, TranslationPlatformClient};

/// Builds HTTP clients for one acting user at a time.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    terminology_http: reqwest::Client,
    platform_http: reqwest::Client,
    llm_http: reqwest::Client,
    terminology: TerminologyConfig,
    platform: PlatformConfig,
    llm: LlmConfig,
}

fn build_http(timeout_seconds: u64) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to build HTTP client: {e}"),
                e,
            )
        })
}

impl HttpClientFactory {
    /// Create a factory from the collaborator settings.
    pub fn new(
        terminology: TerminologyConfig,
        platform: PlatformConfig,
        llm: LlmConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            terminology_http: build_http(terminology.timeout_seconds)?,
            platform_http: build_http(platform.timeout_seconds)?,
            llm_http: build_http(llm.timeout_seconds)?,
            terminology,
            platform,
            llm,
        })
    }

    /// Terminology server URL serving `selection_scope`.
    fn terminology_url(&self, selection_scope: &str) -> &str {
        if selection_scope == self.terminology.derivatives_codesystem {
            self.terminology
                .derivatives_url
                .as_deref()
                .unwrap_or(&self.terminology.url)
        } else {
            &self.terminology.url
        }
    }
}

impl ClientFactory for HttpClientFactory {
    fn terminology(
        &self,
        acting_user: &str,
        selection_scope: &str,
    ) -> AppResult<Arc<dyn TerminologyClient>> {
        Ok(Arc::new(HttpTerminologyClient::new(
            self.terminology_http.clone(),
            self.terminology_url(selection_scope),
            acting_user,
            self.terminology.id_page_size,
        )))
    }

    fn platform(&self, acting_user: &str) -> AppResult<Arc<dyn TranslationPlatformClient>> {
        Ok(Arc::new(HttpPlatformClient::new(
            self.platform_http.clone(),
            &self.platform.url,
            self.platform.web_url(),
            &self.platform.api_token,
            acting_user,
        )))
    }

    fn llm(&self) -> AppResult<Arc<dyn LlmClient>> {
        Ok(Arc::new(HttpLlmClient::new(
            self.llm_http.clone(),
            self.llm.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> HttpClientFactory {
        HttpClientFactory::new(
            TerminologyConfig {
                url: "http://snowstorm".to_string(),
                derivatives_url: Some("http://derivatives".to_string()),
                derivatives_codesystem: "SNOMEDCT-DERIVATIVES".to_string(),
                id_page_size: 100,
                timeout_seconds: 5,
            },
            PlatformConfig {
                url: "http://platform/api".to_string(),
                api_token: "t".to_string(),
                timeout_seconds: 5,
            },
            LlmConfig {
                url: "http://llm".to_string(),
                api_key: "k".to_string(),
                fast_model: "fast".to_string(),
                good_model: "good".to_string(),
                timeout_seconds: 5,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_derivatives_scope_routes_to_derivatives_server() {
        let f = factory();
        assert_eq!(f.terminology_url("SNOMEDCT-DERIVATIVES"), "http://derivatives");
        assert_eq!(f.terminology_url("SNOMEDCT"), "http://snowstorm");
    }

    #[test]
    fn test_platform_web_url() {
        let f = factory();
        let client = f.platform("alice").unwrap();
        assert_eq!(client.web_url(), "http://platform");
    }
}
