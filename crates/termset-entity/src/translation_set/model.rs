//! Translation set entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::TranslationSetStatus;

const CODESYSTEM_PREFIX: &str = "SNOMEDCT-";

/// One golden example shown to the LLM.
///
/// `key` has the form `"{conceptId}|{sourceTerm}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiGoldenExample {
    /// Concept id and source term joined by `|`.
    pub key: String,
    /// Reference translation.
    pub translation: String,
}

impl AiGoldenExample {
    /// Source term part of the key, if the key is well formed.
    pub fn source_term(&self) -> Option<&str> {
        self.key.split_once('|').map(|(_, term)| term)
    }
}

/// A named, query-defined subset of terminology content being translated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSet {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning code system short name, e.g. `SNOMEDCT-BE`.
    pub codesystem: String,
    /// Language reference set the translations belong to.
    pub refset: String,
    /// Display name.
    pub name: String,
    /// Label unique within codesystem and refset.
    pub label: String,
    /// Selection criteria (ECL).
    #[serde(rename = "ecl")]
    pub query_expression: String,
    /// Terminology source the query runs against.
    pub selection_scope: String,
    /// Target language, resolved at creation time.
    pub language_code: Option<String>,
    /// Free-text guidance forwarded to the LLM.
    pub ai_language_advice: Option<String>,
    /// Ordered translation examples forwarded to the LLM.
    #[sqlx(json)]
    pub ai_golden_set: Vec<AiGoldenExample>,
    /// Lifecycle state.
    pub status: TranslationSetStatus,
    /// Progress of the current or last job, 0 to 100.
    pub percentage_processed: i32,
    /// Number of units in the set, once known.
    pub size: i32,
    /// Message describing the last failure.
    pub error_message: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Browse URL on the platform, filled in for listing only.
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_url: Option<String>,
}

impl TranslationSet {
    /// Build a new set in `INITIALISING` from a creation request.
    pub fn new(data: CreateTranslationSet, language_code: String, start_percentage: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            codesystem: data.codesystem,
            refset: data.refset,
            name: data.name,
            label: data.label,
            query_expression: data.query_expression,
            selection_scope: data.selection_scope,
            language_code: Some(language_code),
            ai_language_advice: data.ai_language_advice,
            ai_golden_set: data.ai_golden_set,
            status: TranslationSetStatus::Initialising,
            percentage_processed: start_percentage,
            size: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
            platform_url: None,
        }
    }

    /// Platform label grouping every unit of this set.
    pub fn composite_label(&self) -> String {
        let codesystem = self
            .codesystem
            .strip_prefix(CODESYSTEM_PREFIX)
            .unwrap_or(&self.codesystem);
        format!("{}_{}_{}", codesystem, self.refset, self.label)
    }

    /// Platform translation slug, `{languageCode}-{refset}`.
    pub fn language_code_with_refset(&self) -> String {
        format!(
            "{}-{}",
            self.language_code.as_deref().unwrap_or_default(),
            self.refset
        )
    }

    /// Set status and progress together, bumping `updated_at`.
    pub fn transition(&mut self, status: TranslationSetStatus, percentage: i32) {
        self.status = status;
        self.percentage_processed = percentage.clamp(0, 100);
        self.updated_at = Utc::now();
    }

    /// Current values of the job-owned columns.
    pub fn progress(&self) -> SetProgress {
        SetProgress {
            status: self.status,
            percentage_processed: self.percentage_processed,
            size: self.size,
            error_message: self.error_message.clone(),
        }
    }

    /// Overwrite the job-owned columns, bumping `updated_at`.
    pub fn apply_progress(&mut self, progress: &SetProgress) {
        self.status = progress.status;
        self.percentage_processed = progress.percentage_processed.clamp(0, 100);
        self.size = progress.size;
        self.error_message = progress.error_message.clone();
        self.updated_at = Utc::now();
    }
}

/// Status, progress, size and failure message of a set.
///
/// These are the only columns jobs write; the AI fields belong to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetProgress {
    pub status: TranslationSetStatus,
    pub percentage_processed: i32,
    pub size: i32,
    pub error_message: Option<String>,
}

impl SetProgress {
    /// `FAILED` at the current percentage with `message`.
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = TranslationSetStatus::Failed;
        self.error_message = Some(message.into());
        self
    }
}

/// Data required to create a new translation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTranslationSet {
    /// Owning code system.
    pub codesystem: String,
    /// Language reference set.
    pub refset: String,
    /// Display name.
    pub name: String,
    /// Label unique within codesystem and refset.
    pub label: String,
    /// Selection criteria.
    pub query_expression: String,
    /// Terminology source the query runs against.
    pub selection_scope: String,
    /// Optional LLM guidance.
    pub ai_language_advice: Option<String>,
    /// Optional LLM examples.
    pub ai_golden_set: Vec<AiGoldenExample>,
}

/// Mutable AI fields of an existing set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTranslationSet {
    /// Replacement language advice.
    pub ai_language_advice: Option<String>,
    /// Replacement golden set.
    pub ai_golden_set: Option<Vec<AiGoldenExample>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codesystem: &str) -> TranslationSet {
        TranslationSet::new(
            CreateTranslationSet {
                codesystem: codesystem.to_string(),
                refset: "31000172101".to_string(),
                name: "Cardiology".to_string(),
                label: "cardio".to_string(),
                query_expression: "<< 49601007".to_string(),
                selection_scope: "SNOMEDCT".to_string(),
                ai_language_advice: None,
                ai_golden_set: Vec::new(),
            },
            "nl".to_string(),
            5,
        )
    }

    #[test]
    fn test_composite_label_strips_prefix() {
        assert_eq!(set("SNOMEDCT-BE").composite_label(), "BE_31000172101_cardio");
        assert_eq!(set("LOCAL").composite_label(), "LOCAL_31000172101_cardio");
    }

    #[test]
    fn test_language_code_with_refset() {
        assert_eq!(set("SNOMEDCT-BE").language_code_with_refset(), "nl-31000172101");
    }

    #[test]
    fn test_new_set_is_initialising() {
        let s = set("SNOMEDCT-BE");
        assert_eq!(s.status, TranslationSetStatus::Initialising);
        assert_eq!(s.percentage_processed, 5);
    }

    #[test]
    fn test_transition_clamps() {
        let mut s = set("SNOMEDCT-BE");
        s.transition(TranslationSetStatus::Processing, 140);
        assert_eq!(s.percentage_processed, 100);
        s.transition(TranslationSetStatus::Processing, -3);
        assert_eq!(s.percentage_processed, 0);
    }

    #[test]
    fn test_apply_progress_leaves_ai_fields() {
        let mut s = set("SNOMEDCT-BE");
        s.ai_language_advice = Some("Use formal Dutch.".to_string());
        let progress = s.progress().failed("Processing timed out");
        s.apply_progress(&progress);
        assert_eq!(s.status, TranslationSetStatus::Failed);
        assert_eq!(s.percentage_processed, 5);
        assert_eq!(s.error_message.as_deref(), Some("Processing timed out"));
        assert_eq!(s.ai_language_advice.as_deref(), Some("Use formal Dutch."));
    }

    #[test]
    fn test_golden_source_term() {
        let ex = AiGoldenExample {
            key: "22298006|Myocardial infarction".to_string(),
            translation: "Myocardinfarct".to_string(),
        };
        assert_eq!(ex.source_term(), Some("Myocardial infarction"));
    }
}
