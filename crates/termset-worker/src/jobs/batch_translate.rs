//! Batch AI translation: request suggestions for untranslated units and
//! upload them to the platform.

use std::sync::Arc;

use async_trait::async_trait;

use termset_client::traits::ClientFactory;
use termset_core::error::AppError;
use termset_entity::assignment::BatchTranslateRequest;
use termset_entity::job::{Job, JobType};
use termset_entity::platform::{Unit, UnitQuery, UnitTranslation};

use crate::executor::JobHandler;
use crate::jobs::UNTRANSLATED_STATE;
use crate::progress::ProgressTracker;
use crate::suggestion::suggest_translations;

/// `round((page_size / requested) * 100 / 2)`, applied twice per page.
pub fn half_page_increment(page_size: u32, requested: u32) -> i32 {
    if requested == 0 {
        return 0;
    }
    let a = u64::from(page_size) * 100;
    let b = u64::from(requested);
    ((a + b) / (2 * b)) as i32
}

/// Handles `BATCH_AI_TRANSLATE` jobs.
#[derive(Debug)]
pub struct BatchTranslateHandler {
    clients: Arc<dyn ClientFactory>,
    max_page_size: u32,
}

impl BatchTranslateHandler {
    /// Create a handler fetching at most `max_page_size` units per page.
    pub fn new(clients: Arc<dyn ClientFactory>, max_page_size: u32) -> Self {
        Self {
            clients,
            max_page_size: max_page_size.max(1),
        }
    }
}

#[async_trait]
impl JobHandler for BatchTranslateHandler {
    fn job_type(&self) -> JobType {
        JobType::BatchAiTranslate
    }

    async fn execute(&self, job: &Job, progress: &mut ProgressTracker) -> Result<(), AppError> {
        let request: BatchTranslateRequest = job.message().request()?;
        request.validate()?;

        let set = progress.set().clone();
        let language_slug = set.language_code_with_refset();
        let platform = self.clients.platform(&job.acting_user)?;
        let llm = self.clients.llm()?;

        let requested = u64::from(request.size);
        let page_size = self.max_page_size.min(request.size);
        let step = half_page_increment(page_size, request.size);
        let query = UnitQuery::new(&language_slug)
            .label(set.composite_label())
            .state(UNTRANSLATED_STATE)
            .page_size(page_size);

        let mut percentage = 0;
        let mut processed: u64 = 0;
        let mut sent: u64 = 0;
        let mut page_number = 1;
        loop {
            let page = platform
                .get_unit_page(&query.clone().page(page_number))
                .await?;

            let remaining = usize::try_from(requested - processed).unwrap_or(usize::MAX);
            let units: Vec<&Unit> = page.results.iter().take(remaining).collect();
            processed += units.len() as u64;

            // Multi-segment units are not supported by the suggestion format.
            let retained: Vec<(&Unit, &str)> = units
                .iter()
                .copied()
                .filter_map(|unit| unit.single_source().map(|source| (unit, source)))
                .collect();
            let more = page.has_next() && processed < requested;
            if retained.is_empty() {
                if !more {
                    break;
                }
                page_number += 1;
                continue;
            }

            let sources: Vec<String> = retained.iter().map(|(_, s)| s.to_string()).collect();
            sent += sources.len() as u64;
            let suggestions = suggest_translations(
                llm.as_ref(),
                &set,
                &sources,
                request.dual_suggestions,
                request.fast,
            )
            .await?;
            percentage += step;
            progress.set_progress(percentage).await?;

            let uploads: Vec<UnitTranslation> = retained
                .iter()
                .filter_map(|(unit, source)| {
                    let ranked = suggestions.get(*source)?;
                    let keep = if request.dual_suggestions { ranked.len() } else { 1 };
                    Some(UnitTranslation {
                        context: unit.context.clone(),
                        suggestions: ranked.iter().take(keep).cloned().collect(),
                    })
                })
                .collect();
            if !uploads.is_empty() {
                platform.upload_translations(&language_slug, &uploads).await?;
            }
            tracing::info!(
                "Uploaded {} suggestions for page {} of set {}",
                uploads.len(),
                page_number,
                set.label
            );
            percentage += step;
            progress.set_progress(percentage).await?;

            if !more {
                break;
            }
            page_number += 1;
        }

        if sent == 0 {
            return Err(AppError::nothing_to_translate("Nothing found to translate."));
        }
        progress.complete().await?;
        Ok(())
    }
}
