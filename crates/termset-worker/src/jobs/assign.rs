//! Work assignment: split a set's untranslated units among translators.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use termset_client::traits::{ClientFactory, TranslationPlatformClient};
use termset_core::error::AppError;
use termset_entity::PLATFORM_PROJECT;
use termset_entity::assignment::WorkAssignmentRequest;
use termset_entity::job::{Job, JobType};
use termset_entity::platform::{
    Label, UnitQuery, assignment_label_description, assignment_label_name,
};

use crate::distribution::WorkDistributionPlan;
use crate::executor::JobHandler;
use crate::jobs::UNTRANSLATED_STATE;
use crate::progress::ProgressTracker;

/// Progress while pages stream, capped below 100 until the run completes.
pub fn assignment_progress(processed: u64, total: u64, cap: i32) -> i32 {
    if total == 0 {
        return cap;
    }
    let pct = (processed.saturating_mul(100) / total).min(100) as i32;
    pct.min(cap)
}

/// Handles `ASSIGN_WORK` jobs.
#[derive(Debug)]
pub struct AssignWorkHandler {
    clients: Arc<dyn ClientFactory>,
    page_size: u32,
    progress_cap: i32,
}

impl AssignWorkHandler {
    /// Create a handler fetching `page_size` units per page.
    pub fn new(clients: Arc<dyn ClientFactory>, page_size: u32, progress_cap: i32) -> Self {
        Self {
            clients,
            page_size,
            progress_cap,
        }
    }

    /// Fetch or create one label per user. Users whose label cannot be
    /// provisioned are left out.
    async fn provision_labels(
        platform: &dyn TranslationPlatformClient,
        request: &WorkAssignmentRequest,
    ) -> HashMap<String, Label> {
        let mut labels = HashMap::new();
        for assignment in &request.assignments {
            let username = &assignment.username;
            match platform
                .get_create_label(
                    PLATFORM_PROJECT,
                    &assignment_label_name(username),
                    &assignment_label_description(username),
                )
                .await
            {
                Ok(label) => {
                    tracing::debug!("Created/cached label for user: {}", username);
                    labels.insert(username.clone(), label);
                }
                Err(e) => {
                    tracing::error!("Failed to create label for user {}: {}", username, e);
                }
            }
        }
        labels
    }
}

#[async_trait]
impl JobHandler for AssignWorkHandler {
    fn job_type(&self) -> JobType {
        JobType::AssignWork
    }

    async fn execute(&self, job: &Job, progress: &mut ProgressTracker) -> Result<(), AppError> {
        let request: WorkAssignmentRequest = job.message().request()?;
        request.validate()?;

        let set = progress.set().clone();
        let composite_label = set.composite_label();
        let platform = self.clients.platform(&job.acting_user)?;
        let query = UnitQuery::new(set.language_code_with_refset())
            .label(&composite_label)
            .state(UNTRANSLATED_STATE)
            .fastest_sort(true);

        let count_page = platform
            .get_unit_page(&query.clone().page_size(1))
            .await?;
        let total = count_page.count;
        tracing::info!("Found {} units with label: {}", total, composite_label);

        if total == 0 {
            progress.complete().await?;
            return Ok(());
        }

        let mut plan = WorkDistributionPlan::new(&request, total);
        let labels = Self::provision_labels(platform.as_ref(), &request).await;

        let mut processed: u64 = 0;
        let mut page_number = 1;
        loop {
            let page = platform
                .get_unit_page(&query.clone().page(page_number).page_size(self.page_size))
                .await?;

            let mut units_by_user: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for unit in &page.results {
                processed += 1;
                let Some(username) = plan.assign_next() else {
                    continue;
                };
                if labels.contains_key(username) {
                    units_by_user
                        .entry(username.to_string())
                        .or_default()
                        .push(unit.context.clone());
                }
            }

            for (username, contexts) in &units_by_user {
                if let Some(label) = labels.get(username) {
                    platform
                        .bulk_add_label(PLATFORM_PROJECT, label.id, contexts)
                        .await?;
                    tracing::debug!("Bulk assigned {} units to user {}", contexts.len(), username);
                }
            }

            progress
                .set_progress(assignment_progress(processed, total, self.progress_cap))
                .await?;

            if !page.has_next() || page.results.is_empty() {
                break;
            }
            page_number += 1;
        }

        for quota in plan.entries() {
            tracing::info!(
                "Assigned {} units ({}%) to user: {}",
                quota.units_assigned,
                quota.percentage,
                quota.username
            );
        }

        progress.complete().await?;
        tracing::info!("Work assignment completed for label: {}", composite_label);
        Ok(())
    }
}
