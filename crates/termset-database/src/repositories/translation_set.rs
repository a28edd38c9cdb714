//! Translation set repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use termset_core::error::{AppError, ErrorKind};
use termset_core::result::AppResult;
use termset_entity::translation_set::{AiGoldenExample, SetProgress, TranslationSet};

use crate::traits::TranslationSetStore;

/// Translation sets stored in the `translation_sets` table.
#[derive(Debug, Clone)]
pub struct PgTranslationSetStore {
    pool: PgPool,
}

impl PgTranslationSetStore {
    /// Create a new translation set repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranslationSetStore for PgTranslationSetStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TranslationSet>> {
        sqlx::query_as::<_, TranslationSet>("SELECT * FROM translation_sets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find translation set", e)
            })
    }

    async fn find_by_codesystem(
        &self,
        codesystem: &str,
        refset: Option<&str>,
    ) -> AppResult<Vec<TranslationSet>> {
        sqlx::query_as::<_, TranslationSet>(
            "SELECT * FROM translation_sets \
             WHERE codesystem = $1 AND ($2::text IS NULL OR refset = $2) \
             ORDER BY name",
        )
        .bind(codesystem)
        .bind(refset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list translation sets", e)
        })
    }

    async fn find_by_identity(
        &self,
        codesystem: &str,
        label: &str,
        refset: &str,
    ) -> AppResult<Option<TranslationSet>> {
        sqlx::query_as::<_, TranslationSet>(
            "SELECT * FROM translation_sets WHERE codesystem = $1 AND label = $2 AND refset = $3",
        )
        .bind(codesystem)
        .bind(label)
        .bind(refset)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find translation set", e)
        })
    }

    async fn create(&self, set: &TranslationSet) -> AppResult<TranslationSet> {
        sqlx::query_as::<_, TranslationSet>(
            "INSERT INTO translation_sets \
             (id, codesystem, refset, name, label, query_expression, selection_scope, \
              language_code, ai_language_advice, ai_golden_set, status, percentage_processed, \
              size, error_message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING *",
        )
        .bind(set.id)
        .bind(&set.codesystem)
        .bind(&set.refset)
        .bind(&set.name)
        .bind(&set.label)
        .bind(&set.query_expression)
        .bind(&set.selection_scope)
        .bind(&set.language_code)
        .bind(&set.ai_language_advice)
        .bind(Json(&set.ai_golden_set))
        .bind(set.status)
        .bind(set.percentage_processed)
        .bind(set.size)
        .bind(&set.error_message)
        .bind(set.created_at)
        .bind(set.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return AppError::conflict("A translation set with this label already exists.");
                }
            }
            AppError::with_source(ErrorKind::Database, "Failed to create translation set", e)
        })
    }

    async fn update_progress(&self, id: Uuid, progress: &SetProgress) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE translation_sets SET status = $2, percentage_processed = $3, size = $4, \
             error_message = $5, updated_at = NOW() \
             WHERE id = $1 AND status <> 'DELETING'",
        )
        .bind(id)
        .bind(progress.status)
        .bind(progress.percentage_processed.clamp(0, 100))
        .bind(progress.size)
        .bind(&progress.error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update translation set progress", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_ai_fields(
        &self,
        id: Uuid,
        advice: Option<&str>,
        golden_set: &[AiGoldenExample],
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE translation_sets SET ai_language_advice = $2, ai_golden_set = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(advice)
        .bind(Json(golden_set))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update translation set", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM translation_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete translation set", e)
            })?;
        Ok(())
    }
}
