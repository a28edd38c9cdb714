//! Translation set domain entities.

pub mod model;
pub mod status;

pub use model::{
    AiGoldenExample, CreateTranslationSet, SetProgress, TranslationSet, UpdateTranslationSet,
};
pub use status::TranslationSetStatus;
