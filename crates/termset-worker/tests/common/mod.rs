//! Shared fixtures for processor tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use termset_client::fake::{FakeClients, FakeLlm, FakePlatform, FakeTerminology};
use termset_core::config::ProcessingConfig;
use termset_core::result::AppResult;
use termset_database::{JobStore, MemoryJobStore, MemoryTranslationSetStore, TranslationSetStore};
use termset_entity::job::{Job, JobMessage};
use termset_entity::translation_set::{
    AiGoldenExample, CreateTranslationSet, SetProgress, TranslationSet, TranslationSetStatus,
};
use termset_worker::executor::JobExecutor;
use termset_worker::jobs::register_all;
use termset_worker::queue::JobQueue;

pub const QUEUE: &str = "translation-set.processing";
pub const LANG_REFSET: &str = "nl-31000172101";
pub const COMPOSITE_LABEL: &str = "BE_31000172101_cardio";

/// Set store that remembers every progress write as `(status, percentage)`.
#[derive(Debug, Default)]
pub struct RecordingSetStore {
    inner: MemoryTranslationSetStore,
    saves: Mutex<Vec<(TranslationSetStatus, i32)>>,
}

impl RecordingSetStore {
    pub fn saves(&self) -> Vec<(TranslationSetStatus, i32)> {
        self.saves.lock().unwrap().clone()
    }

    pub fn percentages(&self) -> Vec<i32> {
        self.saves().into_iter().map(|(_, pct)| pct).collect()
    }
}

#[async_trait]
impl TranslationSetStore for RecordingSetStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TranslationSet>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_codesystem(
        &self,
        codesystem: &str,
        refset: Option<&str>,
    ) -> AppResult<Vec<TranslationSet>> {
        self.inner.find_by_codesystem(codesystem, refset).await
    }

    async fn find_by_identity(
        &self,
        codesystem: &str,
        label: &str,
        refset: &str,
    ) -> AppResult<Option<TranslationSet>> {
        self.inner.find_by_identity(codesystem, label, refset).await
    }

    async fn create(&self, set: &TranslationSet) -> AppResult<TranslationSet> {
        self.inner.create(set).await
    }

    async fn update_progress(&self, id: Uuid, progress: &SetProgress) -> AppResult<bool> {
        self.saves
            .lock()
            .unwrap()
            .push((progress.status, progress.percentage_processed));
        self.inner.update_progress(id, progress).await
    }

    async fn update_ai_fields(
        &self,
        id: Uuid,
        advice: Option<&str>,
        golden_set: &[AiGoldenExample],
    ) -> AppResult<bool> {
        self.inner.update_ai_fields(id, advice, golden_set).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.inner.delete(id).await
    }
}

pub fn new_set() -> TranslationSet {
    TranslationSet::new(
        CreateTranslationSet {
            codesystem: "SNOMEDCT-BE".to_string(),
            refset: "31000172101".to_string(),
            name: "Cardiology".to_string(),
            label: "cardio".to_string(),
            query_expression: "<< 49601007".to_string(),
            selection_scope: "SNOMEDCT".to_string(),
            ai_language_advice: Some("Use formal Dutch.".to_string()),
            ai_golden_set: vec![AiGoldenExample {
                key: "22298006|Myocardial infarction".to_string(),
                translation: "myocardinfarct".to_string(),
            }],
        },
        "nl".to_string(),
        5,
    )
}

pub fn contexts(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{:06}", i)).collect()
}

/// Stores, queue and executor wired around a set of fake clients.
pub struct Harness {
    pub sets: Arc<RecordingSetStore>,
    pub jobs: Arc<MemoryJobStore>,
    pub queue: JobQueue,
    pub executor: JobExecutor,
    pub clients: FakeClients,
}

impl Harness {
    pub fn new(terminology: FakeTerminology, platform: FakePlatform) -> Self {
        Self::with_config(terminology, platform, ProcessingConfig::default())
    }

    pub fn with_config(
        terminology: FakeTerminology,
        platform: FakePlatform,
        config: ProcessingConfig,
    ) -> Self {
        let sets = Arc::new(RecordingSetStore::default());
        let jobs = Arc::new(MemoryJobStore::new());
        let clients = FakeClients::new(terminology, platform, FakeLlm::new());
        let mut executor = JobExecutor::new(sets.clone(), jobs.clone());
        register_all(&mut executor, Arc::new(clients.clone()), &config);
        Self {
            queue: JobQueue::new(jobs.clone(), QUEUE),
            sets,
            jobs,
            executor,
            clients,
        }
    }

    /// Persist `set` in `status`.
    pub async fn insert_set(&self, mut set: TranslationSet, status: TranslationSetStatus) -> TranslationSet {
        let pct = set.percentage_processed;
        set.transition(status, pct);
        self.sets.create(&set).await.unwrap()
    }

    /// Enqueue `message`, claim it and run it the way the runner does.
    pub async fn run(&self, message: JobMessage) -> Job {
        self.queue.enqueue(message).await.unwrap();
        let job = self.queue.dequeue("test-worker").await.unwrap().unwrap();
        self.finish(&job).await
    }

    /// Execute an already claimed job and record its outcome.
    pub async fn finish(&self, job: &Job) -> Job {
        match self.executor.execute(job).await {
            Ok(()) => self.queue.complete(job.id).await.unwrap(),
            Err(e) => self.queue.fail(job.id, &e.to_string()).await.unwrap(),
        };
        self.jobs.find_by_id(job.id).await.unwrap().unwrap()
    }

    pub async fn reload(&self, id: Uuid) -> TranslationSet {
        self.sets.find_by_id(id).await.unwrap().unwrap()
    }
}
