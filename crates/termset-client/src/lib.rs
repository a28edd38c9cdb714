//! # termset-client
//!
//! Boundaries to the three external collaborators: the terminology server
//! that resolves selection queries, the translation platform that holds
//! units and labels, and the LLM that proposes translations. Each boundary
//! is a trait with a reqwest implementation; [`HttpClientFactory`] hands out
//! instances scoped to one acting user.

#[cfg(feature = "testing")]
pub mod fake;
pub mod factory;
pub mod llm;
pub mod platform;
pub mod terminology;
pub mod traits;

mod http;

pub use factory::HttpClientFactory;
pub use traits::{
    ClientFactory, ConceptIdStream, LlmClient, TerminologyClient, TranslationPlatformClient,
};
