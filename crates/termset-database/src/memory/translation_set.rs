//! In-memory translation set store using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use termset_core::error::AppError;
use termset_core::result::AppResult;
use termset_entity::translation_set::{
    AiGoldenExample, SetProgress, TranslationSet, TranslationSetStatus,
};

use crate::traits::TranslationSetStore;

/// Translation sets held in a concurrent map keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranslationSetStore {
    sets: Arc<DashMap<Uuid, TranslationSet>>,
}

impl MemoryTranslationSetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranslationSetStore for MemoryTranslationSetStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TranslationSet>> {
        Ok(self.sets.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_codesystem(
        &self,
        codesystem: &str,
        refset: Option<&str>,
    ) -> AppResult<Vec<TranslationSet>> {
        let mut sets: Vec<TranslationSet> = self
            .sets
            .iter()
            .filter(|entry| {
                let set = entry.value();
                set.codesystem == codesystem && refset.is_none_or(|r| set.refset == r)
            })
            .map(|entry| entry.value().clone())
            .collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    async fn find_by_identity(
        &self,
        codesystem: &str,
        label: &str,
        refset: &str,
    ) -> AppResult<Option<TranslationSet>> {
        Ok(self
            .sets
            .iter()
            .find(|entry| {
                let set = entry.value();
                set.codesystem == codesystem && set.label == label && set.refset == refset
            })
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, set: &TranslationSet) -> AppResult<TranslationSet> {
        if self
            .find_by_identity(&set.codesystem, &set.label, &set.refset)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "A translation set with this label already exists.",
            ));
        }
        self.sets.insert(set.id, set.clone());
        Ok(set.clone())
    }

    async fn update_progress(&self, id: Uuid, progress: &SetProgress) -> AppResult<bool> {
        let Some(mut set) = self.sets.get_mut(&id) else {
            return Ok(false);
        };
        if set.status == TranslationSetStatus::Deleting {
            return Ok(false);
        }
        set.apply_progress(progress);
        Ok(true)
    }

    async fn update_ai_fields(
        &self,
        id: Uuid,
        advice: Option<&str>,
        golden_set: &[AiGoldenExample],
    ) -> AppResult<bool> {
        let Some(mut set) = self.sets.get_mut(&id) else {
            return Ok(false);
        };
        set.ai_language_advice = advice.map(str::to_string);
        set.ai_golden_set = golden_set.to_vec();
        set.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.sets.remove(&id);
        Ok(())
    }
}
