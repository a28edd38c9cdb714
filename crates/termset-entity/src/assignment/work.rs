//! Work assignment request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use termset_core::AppError;

/// One translator and the share of the set they should receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAssignment {
    /// Platform username.
    pub username: String,
    /// Share of the set, 0 to 100.
    pub percentage: u32,
}

/// Ordered list of `(username, percentage)` pairs.
///
/// Percentages need not sum to exactly 100; the last entry absorbs
/// whatever the earlier quotas leave over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAssignmentRequest {
    /// Assignments in the order quotas are handed out.
    pub assignments: Vec<WorkAssignment>,
}

impl WorkAssignmentRequest {
    /// Check the list is non-empty, usernames are present and unique, and
    /// percentages are within range.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.assignments.is_empty() {
            return Err(AppError::validation("At least one assignment is required."));
        }
        let mut seen = HashSet::new();
        let mut total = 0u32;
        for assignment in &self.assignments {
            AppError::require("username", Some(assignment.username.as_str()))?;
            if !seen.insert(assignment.username.as_str()) {
                return Err(AppError::validation(format!(
                    "User '{}' appears more than once.",
                    assignment.username
                )));
            }
            if assignment.percentage > 100 {
                return Err(AppError::validation(format!(
                    "Percentage for user '{}' must be between 0 and 100.",
                    assignment.username
                )));
            }
            total += assignment.percentage;
        }
        if total > 100 {
            return Err(AppError::validation(
                "Assignment percentages must not exceed 100 in total.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(entries: &[(&str, u32)]) -> WorkAssignmentRequest {
        WorkAssignmentRequest {
            assignments: entries
                .iter()
                .map(|(u, p)| WorkAssignment {
                    username: u.to_string(),
                    percentage: *p,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request(&[("ana", 33), ("ben", 33), ("cy", 34)]).validate().is_ok());
        assert!(request(&[("ana", 50)]).validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicates_and_blanks() {
        assert!(request(&[("ana", 50), ("ana", 50)]).validate().is_err());
        assert!(request(&[(" ", 50)]).validate().is_err());
        assert!(request(&[]).validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(request(&[("ana", 101)]).validate().is_err());
        assert!(request(&[("ana", 60), ("ben", 60)]).validate().is_err());
    }
}
