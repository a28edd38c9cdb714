//! Translation set service against in-memory stores and fake clients.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use termset_client::fake::{FakeClients, FakeLlm, FakePlatform, FakeTerminology};
use termset_core::config::ProcessingConfig;
use termset_core::error::{AppError, ErrorKind};
use termset_core::result::AppResult;
use termset_database::{JobStore, MemoryJobStore, MemoryTranslationSetStore, TranslationSetStore};
use termset_entity::assignment::{BatchTranslateRequest, WorkAssignment, WorkAssignmentRequest};
use termset_entity::job::{CreateJob, Job, JobStatus, JobType};
use termset_entity::translation_set::{
    AiGoldenExample, CreateTranslationSet, TranslationSetStatus, UpdateTranslationSet,
};
use termset_service::{RequestContext, TranslationSetService};
use termset_worker::JobExecutor;
use termset_worker::jobs::register_all;
use termset_worker::queue::JobQueue;

const CODESYSTEM: &str = "SNOMEDCT-BE";
const REFSET: &str = "31000172101";
const QUEUE: &str = "translation-set.processing";

struct Fixture {
    service: TranslationSetService,
    sets: Arc<MemoryTranslationSetStore>,
    jobs: Arc<MemoryJobStore>,
    queue: Arc<JobQueue>,
    clients: FakeClients,
    ctx: RequestContext,
}

fn fixture(platform: FakePlatform) -> Fixture {
    fixture_with(FakeTerminology::new(), platform)
}

fn fixture_with(terminology: FakeTerminology, platform: FakePlatform) -> Fixture {
    let sets = Arc::new(MemoryTranslationSetStore::new());
    let jobs = Arc::new(MemoryJobStore::new());
    let queue = Arc::new(JobQueue::new(jobs.clone(), QUEUE));
    let clients = FakeClients::new(
        terminology.with_language(CODESYSTEM, REFSET, "nl"),
        platform,
        FakeLlm::new(),
    );
    let service = TranslationSetService::new(
        sets.clone(),
        Arc::new(clients.clone()),
        queue.clone(),
        ProcessingConfig::default(),
    );
    Fixture {
        service,
        sets,
        jobs,
        queue,
        clients,
        ctx: RequestContext::new("alice"),
    }
}

fn initialised() -> FakePlatform {
    FakePlatform::new().with_translation("nl-31000172101")
}

fn create_request(label: &str) -> CreateTranslationSet {
    CreateTranslationSet {
        codesystem: CODESYSTEM.to_string(),
        refset: REFSET.to_string(),
        name: format!("Set {label}"),
        label: label.to_string(),
        query_expression: "<< 49601007".to_string(),
        selection_scope: "SNOMEDCT".to_string(),
        ai_language_advice: None,
        ai_golden_set: Vec::new(),
    }
}

/// Job store whose inserts always fail.
#[derive(Debug, Default)]
struct UnavailableJobStore {
    inner: MemoryJobStore,
}

#[async_trait]
impl JobStore for UnavailableJobStore {
    async fn create(&self, _data: &CreateJob) -> AppResult<Job> {
        Err(AppError::database("Failed to create job"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        self.inner.find_by_id(id).await
    }

    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        self.inner.claim_next(queue, worker_id).await
    }

    async fn mark_completed(&self, id: Uuid) -> AppResult<bool> {
        self.inner.mark_completed(id).await
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<bool> {
        self.inner.mark_failed(id, error_message).await
    }

    async fn find_stale(&self, before: DateTime<Utc>) -> AppResult<Vec<Job>> {
        self.inner.find_stale(before).await
    }
}

/// The fixture's service, but queueing into a store that rejects jobs.
fn unqueueable(f: &Fixture) -> TranslationSetService {
    let queue = Arc::new(JobQueue::new(Arc::new(UnavailableJobStore::default()), QUEUE));
    TranslationSetService::new(
        f.sets.clone(),
        Arc::new(f.clients.clone()),
        queue,
        ProcessingConfig::default(),
    )
}

fn executor(f: &Fixture) -> JobExecutor {
    let mut executor = JobExecutor::new(f.sets.clone(), f.jobs.clone());
    register_all(
        &mut executor,
        Arc::new(f.clients.clone()),
        &ProcessingConfig::default(),
    );
    executor
}

async fn ready_set(f: &Fixture, label: &str) {
    let set = f.service.create_set(&f.ctx, create_request(label)).await.unwrap();
    let mut progress = set.progress();
    progress.status = TranslationSetStatus::Ready;
    progress.percentage_processed = 100;
    f.sets.update_progress(set.id, &progress).await.unwrap();
    // Drain the creation job so later dequeues see only new work.
    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    f.queue.complete(job.id).await.unwrap();
}

#[tokio::test]
async fn test_create_set_persists_and_enqueues() {
    let f = fixture(initialised());
    let set = f.service.create_set(&f.ctx, create_request("cardio")).await.unwrap();

    assert_eq!(set.status, TranslationSetStatus::Initialising);
    assert_eq!(set.percentage_processed, 0);
    assert_eq!(set.language_code.as_deref(), Some("nl"));

    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert_eq!(job.job_type, JobType::Create);
    assert_eq!(job.acting_user, "alice");
    assert_eq!(job.target_set_id, set.id);
    assert!(job.payload.is_none());
}

#[tokio::test]
async fn test_create_set_requires_fields() {
    let f = fixture(initialised());
    let mut request = create_request("cardio");
    request.query_expression = String::new();

    let err = f.service.create_set(&f.ctx, request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Parameter 'ecl' is required.");
    assert!(f.queue.dequeue("test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_set_rejects_duplicate_label() {
    let f = fixture(initialised());
    f.service.create_set(&f.ctx, create_request("cardio")).await.unwrap();

    let err = f
        .service
        .create_set(&f.ctx, create_request("cardio"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_create_set_unknown_language() {
    let f = fixture(initialised());
    let mut request = create_request("cardio");
    request.refset = "999".to_string();

    let err = f.service.create_set(&f.ctx, request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Language code not found for refset: 999");
}

#[tokio::test]
async fn test_create_set_needs_initialised_translation() {
    let f = fixture(FakePlatform::new());

    let err = f
        .service
        .create_set(&f.ctx, create_request("cardio"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.starts_with("Translation does not exist"));
    assert!(
        f.sets
            .find_by_codesystem(CODESYSTEM, None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_list_sets_decorates_ready_and_purges_deleted() {
    let f = fixture(initialised());
    ready_set(&f, "b-ready").await;
    f.service.create_set(&f.ctx, create_request("a-new")).await.unwrap();
    ready_set(&f, "c-gone").await;
    f.service
        .delete_set(&f.ctx, CODESYSTEM, REFSET, "c-gone")
        .await
        .unwrap();

    let listed = f.service.list_sets(&f.ctx, CODESYSTEM, Some(REFSET)).await.unwrap();

    let labels: Vec<&str> = listed.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["a-new", "b-ready"]);
    assert!(listed[0].platform_url.is_none());
    assert_eq!(
        listed[1].platform_url.as_deref(),
        Some(
            "https://platform.test/translate/common/snomedct/nl-31000172101/\
             ?q=label:\"BE_31000172101_b-ready\""
        )
    );
    assert!(
        f.sets
            .find_by_identity(CODESYSTEM, "c-gone", REFSET)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_find_set_not_found() {
    let f = fixture(initialised());
    let err = f
        .service
        .find_set(CODESYSTEM, REFSET, "missing")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_set_changes_ai_fields_only() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let update = UpdateTranslationSet {
        ai_language_advice: Some("Prefer Latin anatomy.".to_string()),
        ai_golden_set: Some(vec![AiGoldenExample {
            key: "22298006|Myocardial infarction".to_string(),
            translation: "myocardinfarct".to_string(),
        }]),
    };
    let updated = f
        .service
        .update_set(&f.ctx, CODESYSTEM, REFSET, "cardio", update)
        .await
        .unwrap();

    assert_eq!(updated.ai_language_advice.as_deref(), Some("Prefer Latin anatomy."));
    assert_eq!(updated.ai_golden_set.len(), 1);
    assert_eq!(updated.status, TranslationSetStatus::Ready);
    let stored = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(stored.ai_golden_set, updated.ai_golden_set);
}

#[tokio::test]
async fn test_delete_set_marks_deleting_and_enqueues() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let set = f
        .service
        .delete_set(&f.ctx, CODESYSTEM, REFSET, "cardio")
        .await
        .unwrap();
    assert_eq!(set.status, TranslationSetStatus::Deleting);

    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert_eq!(job.job_type, JobType::Delete);
}

#[tokio::test]
async fn test_assign_work_requires_ready_set() {
    let f = fixture(initialised());
    f.service.create_set(&f.ctx, create_request("cardio")).await.unwrap();

    let request = WorkAssignmentRequest {
        assignments: vec![WorkAssignment {
            username: "bob".to_string(),
            percentage: 100,
        }],
    };
    let err = f
        .service
        .assign_work(&f.ctx, CODESYSTEM, REFSET, "cardio", request)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_assign_work_queues_payload() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let request = WorkAssignmentRequest {
        assignments: vec![
            WorkAssignment {
                username: "bob".to_string(),
                percentage: 50,
            },
            WorkAssignment {
                username: "carol".to_string(),
                percentage: 50,
            },
        ],
    };
    let set = f
        .service
        .assign_work(&f.ctx, CODESYSTEM, REFSET, "cardio", request.clone())
        .await
        .unwrap();
    assert_eq!(set.status, TranslationSetStatus::Processing);
    assert_eq!(set.percentage_processed, 5);

    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert_eq!(job.job_type, JobType::AssignWork);
    let queued: WorkAssignmentRequest = job.message().request().unwrap();
    assert_eq!(queued, request);
}

#[tokio::test]
async fn test_assign_work_rejects_invalid_request() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let request = WorkAssignmentRequest {
        assignments: Vec::new(),
    };
    let err = f
        .service
        .assign_work(&f.ctx, CODESYSTEM, REFSET, "cardio", request)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let set = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(set.status, TranslationSetStatus::Ready);
}

#[tokio::test]
async fn test_batch_translate_queues_payload() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let request = BatchTranslateRequest {
        size: 100,
        dual_suggestions: true,
        fast: false,
    };
    f.service
        .batch_ai_translate(&f.ctx, CODESYSTEM, REFSET, "cardio", request.clone())
        .await
        .unwrap();

    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert_eq!(job.job_type, JobType::BatchAiTranslate);
    let queued: BatchTranslateRequest = job.message().request().unwrap();
    assert_eq!(queued, request);
    let stored = f.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Running);
}

#[tokio::test]
async fn test_state_count_and_sample() {
    let platform = initialised().with_units(["000001", "000002", "000003"]);
    platform.label_all("BE_31000172101_cardio");
    platform.add_unit(
        "000004",
        vec!["done".to_string()],
        "translated",
        &["BE_31000172101_cardio"],
    );
    let f = fixture(platform);
    ready_set(&f, "cardio").await;

    let translated = f
        .service
        .state_count(&f.ctx, CODESYSTEM, REFSET, "cardio", "translated")
        .await
        .unwrap();
    assert_eq!(translated, 1);
    let empty = f
        .service
        .state_count(&f.ctx, CODESYSTEM, REFSET, "cardio", "empty")
        .await
        .unwrap();
    assert_eq!(empty, 3);

    let sample = f
        .service
        .sample_units(&f.ctx, CODESYSTEM, REFSET, "cardio", 2)
        .await
        .unwrap();
    assert_eq!(sample.len(), 2);
    assert_eq!(sample[0].context, "000001");
    assert!(f.clients.acting_users().iter().all(|u| u == "alice"));
}

#[tokio::test]
async fn test_create_set_is_removed_when_job_cannot_be_queued() {
    let f = fixture(initialised());
    let err = unqueueable(&f)
        .create_set(&f.ctx, create_request("cardio"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(
        f.sets
            .find_by_identity(CODESYSTEM, "cardio", REFSET)
            .await
            .unwrap()
            .is_none()
    );
    // The label is free again.
    f.service.create_set(&f.ctx, create_request("cardio")).await.unwrap();
}

#[tokio::test]
async fn test_assign_work_restores_set_when_job_cannot_be_queued() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let request = WorkAssignmentRequest {
        assignments: vec![WorkAssignment {
            username: "bob".to_string(),
            percentage: 100,
        }],
    };
    let err = unqueueable(&f)
        .assign_work(&f.ctx, CODESYSTEM, REFSET, "cardio", request.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    let set = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(set.status, TranslationSetStatus::Ready);
    assert_eq!(set.percentage_processed, 100);
    f.service
        .assign_work(&f.ctx, CODESYSTEM, REFSET, "cardio", request)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_set_unchanged_when_job_cannot_be_queued() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    unqueueable(&f)
        .delete_set(&f.ctx, CODESYSTEM, REFSET, "cardio")
        .await
        .unwrap_err();
    let set = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(set.status, TranslationSetStatus::Ready);
}

#[tokio::test]
async fn test_update_keeps_progress_of_running_job() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;
    f.service
        .batch_ai_translate(
            &f.ctx,
            CODESYSTEM,
            REFSET,
            "cardio",
            BatchTranslateRequest {
                size: 10,
                dual_suggestions: false,
                fast: false,
            },
        )
        .await
        .unwrap();

    let update = UpdateTranslationSet {
        ai_language_advice: Some("Prefer Latin anatomy.".to_string()),
        ai_golden_set: None,
    };
    f.service
        .update_set(&f.ctx, CODESYSTEM, REFSET, "cardio", update)
        .await
        .unwrap();

    let set = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(set.status, TranslationSetStatus::Processing);
    assert_eq!(set.percentage_processed, 5);
    assert_eq!(set.ai_language_advice.as_deref(), Some("Prefer Latin anatomy."));
}

#[tokio::test]
async fn test_refresh_requires_failed_or_initialising() {
    let f = fixture(initialised());
    ready_set(&f, "cardio").await;

    let err = f
        .service
        .refresh_set(&f.ctx, CODESYSTEM, REFSET, "cardio")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(f.queue.dequeue("test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_converges_partially_labelled_set() {
    let ids: Vec<String> = (1..=2500).map(|i| format!("{i:06}")).collect();
    let platform = initialised().with_units(ids.clone());
    let f = fixture_with(FakeTerminology::new().with_ids(ids), platform);
    let executor = executor(&f);
    let composite = "BE_31000172101_cardio";

    // First bulk call lands, the second fails.
    f.clients.platform.fail_bulk_after(1);
    let set = f.service.create_set(&f.ctx, create_request("cardio")).await.unwrap();
    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert!(executor.execute(&job).await.is_err());
    f.queue.fail(job.id, "Bulk label request failed").await.unwrap();

    let failed = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(failed.status, TranslationSetStatus::Failed);
    assert_eq!(f.clients.platform.contexts_with_label(composite).len(), 1000);

    f.clients.platform.clear_failures();
    let refreshed = f
        .service
        .refresh_set(&f.ctx, CODESYSTEM, REFSET, "cardio")
        .await
        .unwrap();
    assert_eq!(refreshed.status, TranslationSetStatus::Initialising);
    assert_eq!(refreshed.percentage_processed, 0);
    assert!(refreshed.error_message.is_none());

    let job = f.queue.dequeue("test").await.unwrap().unwrap();
    assert_eq!(job.job_type, JobType::Create);
    assert_eq!(job.target_set_id, set.id);
    executor.execute(&job).await.unwrap();
    f.queue.complete(job.id).await.unwrap();

    let ready = f.service.find_set(CODESYSTEM, REFSET, "cardio").await.unwrap();
    assert_eq!(ready.status, TranslationSetStatus::Ready);
    assert_eq!(ready.size, 2500);
    assert_eq!(f.clients.platform.contexts_with_label(composite).len(), 2500);
}
