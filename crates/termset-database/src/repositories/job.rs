//! Job repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use termset_core::error::{AppError, ErrorKind};
use termset_core::result::AppResult;
use termset_entity::job::{CreateJob, Job};

use crate::traits::JobStore;

/// Jobs stored in the `jobs` table.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        let job = Job::pending(data.clone());
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (id, job_type, queue, acting_user, target_set_id, payload, status, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(job.id)
        .bind(job.job_type)
        .bind(&job.queue)
        .bind(&job.acting_user)
        .bind(job.target_set_id)
        .bind(&job.payload)
        .bind(job.status)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        let claimed = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'running', started_at = NOW(), worker_id = $2, \
             error_message = NULL, updated_at = NOW() \
             WHERE id = ( \
                SELECT j.id FROM jobs j \
                WHERE j.queue = $1 AND j.status = 'pending' \
                AND NOT EXISTS ( \
                    SELECT 1 FROM jobs r \
                    WHERE r.target_set_id = j.target_set_id AND r.status = 'running' \
                ) \
                ORDER BY j.created_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .bind(queue)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await;

        match claimed {
            Ok(job) => Ok(job),
            // Another worker leased the same set between our check and update.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to claim job",
                e,
            )),
        }
    }

    async fn mark_completed(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'completed', completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'running'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'failed', error_message = $2, completed_at = NOW(), \
             updated_at = NOW() WHERE id = $1 AND status = 'running'",
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark job as failed", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_stale(&self, before: DateTime<Utc>) -> AppResult<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'running' AND started_at < $1 ORDER BY started_at",
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find stale jobs", e))
    }
}
