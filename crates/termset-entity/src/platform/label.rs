//! Platform labels.

use serde::{Deserialize, Serialize};

/// A label defined on a platform project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Platform id, used by bulk-label calls.
    pub id: i64,
    /// Label name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Display colour.
    #[serde(default)]
    pub color: String,
}

/// Name of the label marking work assigned to `username`.
pub fn assignment_label_name(username: &str) -> String {
    format!("assigned-{username}")
}

/// Description of the label marking work assigned to `username`.
pub fn assignment_label_description(username: &str) -> String {
    format!("Work assigned to user: {username}")
}
