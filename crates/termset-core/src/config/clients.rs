//! External collaborator connection settings.

use serde::{Deserialize, Serialize};

/// Terminology server (concept query engine) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminologyConfig {
    /// Base URL of the main terminology server.
    pub url: String,
    /// Base URL of the server holding derivative content. Falls back to
    /// `url` when unset.
    #[serde(default)]
    pub derivatives_url: Option<String>,
    /// Selection scope that routes queries to the derivatives server.
    #[serde(default = "default_derivatives_codesystem")]
    pub derivatives_codesystem: String,
    /// Page size used when streaming concept ids.
    #[serde(default = "default_id_page_size")]
    pub id_page_size: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Translation platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// API base URL, e.g. `https://translate.example.org/api`.
    pub url: String,
    /// Service token used for API calls.
    pub api_token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl PlatformConfig {
    /// Browser-facing URL, i.e. the API URL without its `/api` suffix.
    pub fn web_url(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
    }
}

/// LLM provider (OpenAI-compatible chat completions) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL.
    pub url: String,
    /// API key.
    pub api_key: String,
    /// Model used when the caller asks for the faster/cheaper option.
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    /// Model used for higher-quality suggestions.
    #[serde(default = "default_good_model")]
    pub good_model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

fn default_derivatives_codesystem() -> String {
    "SNOMEDCT-DERIVATIVES".to_string()
}

fn default_id_page_size() -> u32 {
    10_000
}

fn default_timeout() -> u64 {
    60
}

fn default_llm_timeout() -> u64 {
    180
}

fn default_fast_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_good_model() -> String {
    "gpt-4o".to_string()
}
