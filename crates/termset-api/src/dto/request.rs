//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use termset_core::error::AppError;
use termset_entity::assignment::{BatchTranslateRequest, WorkAssignment, WorkAssignmentRequest};
use termset_entity::translation_set::{
    AiGoldenExample, CreateTranslationSet, UpdateTranslationSet,
};

/// Run `validator` rules, reporting every failing field in one message.
pub fn validated<T: Validate>(body: T) -> Result<T, AppError> {
    body.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .next()
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {detail}")
            })
            .collect();
        fields.sort();
        if fields.is_empty() {
            return AppError::validation(format!("Invalid request: {errors}"));
        }
        AppError::validation(format!("Invalid request: {}", fields.join(", ")))
    })?;
    Ok(body)
}

/// Body of `POST .../sets`. Required fields are checked by the service so
/// that missing and blank values get the same message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSetRequest {
    /// Display name.
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub name: String,
    /// Label unique within the code system and refset.
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub label: String,
    /// Selection query (ECL).
    pub ecl: String,
    /// Terminology source the query runs against.
    pub selection_scope: String,
    /// LLM guidance.
    pub ai_language_advice: Option<String>,
    /// LLM examples.
    pub ai_golden_set: Vec<AiGoldenExample>,
}

impl CreateSetRequest {
    /// Entity input for the set addressed by `codesystem` and `refset`.
    pub fn into_entity(self, codesystem: String, refset: String) -> CreateTranslationSet {
        CreateTranslationSet {
            codesystem,
            refset,
            name: self.name,
            label: self.label,
            query_expression: self.ecl,
            selection_scope: self.selection_scope,
            ai_language_advice: self.ai_language_advice,
            ai_golden_set: self.ai_golden_set,
        }
    }
}

/// Body of `PUT .../sets/{label}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSetRequest {
    /// Replacement language advice.
    pub ai_language_advice: Option<String>,
    /// Replacement golden set.
    pub ai_golden_set: Option<Vec<AiGoldenExample>>,
}

impl From<UpdateSetRequest> for UpdateTranslationSet {
    fn from(req: UpdateSetRequest) -> Self {
        Self {
            ai_language_advice: req.ai_language_advice,
            ai_golden_set: req.ai_golden_set,
        }
    }
}

/// One translator share.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignmentEntry {
    /// Platform username.
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    /// Share of the set.
    #[validate(range(max = 100, message = "must be between 0 and 100"))]
    pub percentage: u32,
}

/// Body of `POST .../assign-work`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignWorkRequest {
    /// Shares in hand-out order.
    #[validate(length(min = 1, message = "must not be empty"), nested)]
    pub assignments: Vec<AssignmentEntry>,
}

impl From<AssignWorkRequest> for WorkAssignmentRequest {
    fn from(req: AssignWorkRequest) -> Self {
        Self {
            assignments: req
                .assignments
                .into_iter()
                .map(|a| WorkAssignment {
                    username: a.username,
                    percentage: a.percentage,
                })
                .collect(),
        }
    }
}

/// Body of `POST .../ai-translate`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AiTranslateRequest {
    /// Number of units to process.
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub size: u32,
    /// Two suggestions per unit.
    #[serde(default)]
    pub dual_suggestions: bool,
    /// Use the faster model.
    #[serde(default)]
    pub fast: bool,
}

impl From<AiTranslateRequest> for BatchTranslateRequest {
    fn from(req: AiTranslateRequest) -> Self {
        Self {
            size: req.size,
            dual_suggestions: req.dual_suggestions,
            fast: req.fast,
        }
    }
}

/// Query of `GET .../sample`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleQuery {
    /// Units to return.
    #[serde(default = "default_sample_size")]
    pub page_size: u32,
}

fn default_sample_size() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_reports_field() {
        let body = AiTranslateRequest {
            size: 0,
            dual_suggestions: false,
            fast: false,
        };
        let err = validated(body).unwrap_err();
        assert_eq!(err.message, "Invalid request: size must be at least 1");
    }

    #[test]
    fn test_nested_assignment_rules() {
        let body = AssignWorkRequest {
            assignments: vec![AssignmentEntry {
                username: "ana".to_string(),
                percentage: 120,
            }],
        };
        assert!(validated(body).is_err());
    }

    #[test]
    fn test_create_body_defaults_missing_fields() {
        let body: CreateSetRequest = serde_json::from_str(r#"{"name":"Cardiology"}"#).unwrap();
        assert_eq!(body.name, "Cardiology");
        assert!(body.ecl.is_empty());
        assert!(body.ai_golden_set.is_empty());
    }
}
