//! Proportional split of a set's units among translators.

use termset_entity::assignment::WorkAssignmentRequest;

/// One translator's share of a work assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuota {
    /// Platform username.
    pub username: String,
    /// Requested share.
    pub percentage: u32,
    /// Units this user should receive.
    pub units_to_assign: u64,
    /// Units handed out so far.
    pub units_assigned: u64,
}

/// Quotas for every user plus a cursor walking them in order.
///
/// Quotas sum to the total exactly: every entry but the last is rounded half
/// up, and the last takes the remainder. Units beyond the total go to the
/// last user.
#[derive(Debug, Clone)]
pub struct WorkDistributionPlan {
    entries: Vec<UserQuota>,
    cursor: usize,
}

/// `round(percentage / 100 * total)`, halves rounded up.
fn rounded_share(percentage: u32, total: u64) -> u64 {
    (u64::from(percentage) * total * 2 + 100) / 200
}

impl WorkDistributionPlan {
    /// Compute quotas for `total` units.
    pub fn new(request: &WorkAssignmentRequest, total: u64) -> Self {
        let count = request.assignments.len();
        let mut remaining = total;
        let entries = request
            .assignments
            .iter()
            .enumerate()
            .map(|(i, assignment)| {
                let units = if i + 1 == count {
                    remaining
                } else {
                    rounded_share(assignment.percentage, total).min(remaining)
                };
                remaining -= units;
                UserQuota {
                    username: assignment.username.clone(),
                    percentage: assignment.percentage,
                    units_to_assign: units,
                    units_assigned: 0,
                }
            })
            .collect();

        Self { entries, cursor: 0 }
    }

    /// Quotas in request order.
    pub fn entries(&self) -> &[UserQuota] {
        &self.entries
    }

    /// Sum of all quotas.
    pub fn total_quota(&self) -> u64 {
        self.entries.iter().map(|e| e.units_to_assign).sum()
    }

    /// Owner of the next unit in stream order.
    pub fn assign_next(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        while self.cursor < last
            && self.entries[self.cursor].units_assigned >= self.entries[self.cursor].units_to_assign
        {
            self.cursor += 1;
        }
        let entry = &mut self.entries[self.cursor];
        entry.units_assigned += 1;
        Some(entry.username.as_str())
    }
}
