//! Scripted in-process collaborators.
//!
//! These keep their state behind a mutex so a test can seed units, run a
//! processor and then inspect the calls it made. Enabled by the `testing`
//! feature.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use termset_core::error::AppError;
use termset_core::result::AppResult;
use termset_entity::platform::{Label, Unit, UnitPage, UnitQuery, UnitTranslation};

use crate::traits::{
    ClientFactory, ConceptIdStream, LlmClient, TerminologyClient, TranslationPlatformClient,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Terminology server answering every query with a fixed id list.
#[derive(Debug, Default)]
pub struct FakeTerminology {
    languages: Mutex<HashMap<String, HashMap<String, String>>>,
    ids: Mutex<Vec<String>>,
    report_total: Mutex<bool>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FakeTerminology {
    /// Terminology server that reports totals upfront.
    pub fn new() -> Self {
        let fake = Self::default();
        *lock(&fake.report_total) = true;
        fake
    }

    /// Configure `refset → language` on `codesystem`.
    pub fn with_language(self, codesystem: &str, refset: &str, language: &str) -> Self {
        lock(&self.languages)
            .entry(codesystem.to_string())
            .or_default()
            .insert(refset.to_string(), language.to_string());
        self
    }

    /// Ids returned by every query.
    pub fn with_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.ids) = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Withhold the total until the stream is exhausted.
    pub fn without_total(self) -> Self {
        *lock(&self.report_total) = false;
        self
    }

    /// `(branch, query)` pairs streamed so far.
    pub fn queries(&self) -> Vec<(String, String)> {
        lock(&self.queries).clone()
    }
}

/// Id stream over a snapshot.
#[derive(Debug)]
pub struct FakeIdStream {
    ids: VecDeque<String>,
    total: u64,
    report_total: bool,
}

#[async_trait]
impl ConceptIdStream for FakeIdStream {
    async fn next_id(&mut self) -> AppResult<Option<String>> {
        let next = self.ids.pop_front();
        if next.is_none() {
            self.report_total = true;
        }
        Ok(next)
    }

    fn total(&self) -> Option<u64> {
        self.report_total.then_some(self.total)
    }
}

#[async_trait]
impl TerminologyClient for FakeTerminology {
    async fn branch_for_codesystem(&self, codesystem: &str) -> AppResult<String> {
        Ok(format!("MAIN/{codesystem}"))
    }

    async fn translation_languages(&self, codesystem: &str) -> AppResult<HashMap<String, String>> {
        Ok(lock(&self.languages)
            .get(codesystem)
            .cloned()
            .unwrap_or_default())
    }

    async fn stream_matching_ids(
        &self,
        branch: &str,
        query: &str,
    ) -> AppResult<Box<dyn ConceptIdStream>> {
        lock(&self.queries).push((branch.to_string(), query.to_string()));
        let ids: VecDeque<String> = lock(&self.ids).iter().cloned().collect();
        Ok(Box::new(FakeIdStream {
            total: ids.len() as u64,
            ids,
            report_total: *lock(&self.report_total),
        }))
    }
}

/// A unit held by [`FakePlatform`].
#[derive(Debug, Clone)]
pub struct FakeUnit {
    /// The unit as listed.
    pub unit: Unit,
    /// Platform state name, e.g. `empty` or `translated`.
    pub state: String,
    /// Names of labels on the unit.
    pub labels: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct PlatformState {
    units: Vec<FakeUnit>,
    labels: Vec<Label>,
    failing_labels: HashSet<String>,
    translations: HashSet<String>,
    bulk_calls: Vec<(i64, Vec<String>)>,
    uploads: Vec<UnitTranslation>,
    page_requests: Vec<(u32, u32)>,
    fail_bulk_after: Option<usize>,
    reported_count: Option<u64>,
}

/// Translation platform backed by an in-memory unit list, ordered by id.
#[derive(Debug, Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    /// Empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the translation slug as initialised.
    pub fn with_translation(self, language_code_with_refset: &str) -> Self {
        lock(&self.state)
            .translations
            .insert(language_code_with_refset.to_string());
        self
    }

    /// Add untranslated single-segment units `"{context}"` with source
    /// `"term {context}"`.
    pub fn with_units<I, S>(self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for context in contexts {
            let context = context.into();
            let source = format!("term {context}");
            self.add_unit(&context, vec![source], "empty", &[]);
        }
        self
    }

    /// Add a unit.
    pub fn add_unit(&self, context: &str, source: Vec<String>, state: &str, labels: &[&str]) {
        let mut guard = lock(&self.state);
        let id = guard.units.len() as i64 + 1;
        guard.units.push(FakeUnit {
            unit: Unit {
                id,
                source,
                target: Vec::new(),
                context: context.to_string(),
                state: 0,
                labels: Vec::new(),
            },
            state: state.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
    }

    /// Label every unit with `label`.
    pub fn label_all(&self, label: &str) {
        for unit in &mut lock(&self.state).units {
            unit.labels.insert(label.to_string());
        }
    }

    /// Make creating `name` fail.
    pub fn fail_label(&self, name: &str) {
        lock(&self.state).failing_labels.insert(name.to_string());
    }

    /// Let `n` bulk-label calls succeed, then fail the rest.
    pub fn fail_bulk_after(&self, n: usize) {
        lock(&self.state).fail_bulk_after = Some(n);
    }

    /// Report `count` on every listing regardless of the matching units,
    /// as if the population changed after it was counted.
    pub fn report_count(&self, count: u64) {
        lock(&self.state).reported_count = Some(count);
    }

    /// Drop failures configured by [`FakePlatform::fail_label`] and
    /// [`FakePlatform::fail_bulk_after`].
    pub fn clear_failures(&self) {
        let mut guard = lock(&self.state);
        guard.failing_labels.clear();
        guard.fail_bulk_after = None;
    }

    /// Units carrying `label`, by context.
    pub fn contexts_with_label(&self, label: &str) -> Vec<String> {
        lock(&self.state)
            .units
            .iter()
            .filter(|u| u.labels.contains(label))
            .map(|u| u.unit.context.clone())
            .collect()
    }

    /// Labels defined so far.
    pub fn labels(&self) -> Vec<Label> {
        lock(&self.state).labels.clone()
    }

    /// Bulk-label calls as `(label id, contexts)`.
    pub fn bulk_calls(&self) -> Vec<(i64, Vec<String>)> {
        lock(&self.state).bulk_calls.clone()
    }

    /// Uploaded suggestions in upload order.
    pub fn uploads(&self) -> Vec<UnitTranslation> {
        lock(&self.state).uploads.clone()
    }

    /// `(page, page_size)` of every unit listing request.
    pub fn page_requests(&self) -> Vec<(u32, u32)> {
        lock(&self.state).page_requests.clone()
    }
}

#[async_trait]
impl TranslationPlatformClient for FakePlatform {
    async fn get_unit_page(&self, query: &UnitQuery) -> AppResult<UnitPage<Unit>> {
        let mut guard = lock(&self.state);
        let page = query.current_page();
        let page_size = query.current_page_size();
        guard.page_requests.push((page, page_size));

        let matching: Vec<Unit> = guard
            .units
            .iter()
            .filter(|u| query.label_filter().is_none_or(|l| u.labels.contains(l)))
            .filter(|u| query.state_filter().is_none_or(|s| u.state == s))
            .map(|u| u.unit.clone())
            .collect();

        let start = (page as usize - 1) * page_size as usize;
        let end = (start + page_size as usize).min(matching.len());
        let results = matching.get(start..end).map(<[Unit]>::to_vec).unwrap_or_default();
        let next = (end < matching.len()).then(|| format!("?page={}", page + 1));
        Ok(UnitPage {
            count: guard.reported_count.unwrap_or(matching.len() as u64),
            next,
            previous: None,
            results,
        })
    }

    async fn bulk_add_label(
        &self,
        _project: &str,
        label_id: i64,
        context_ids: &[String],
    ) -> AppResult<()> {
        let mut guard = lock(&self.state);
        if let Some(remaining) = guard.fail_bulk_after {
            if remaining == 0 {
                return Err(AppError::external("Bulk label request failed: HTTP 503"));
            }
            guard.fail_bulk_after = Some(remaining - 1);
        }
        let name = guard
            .labels
            .iter()
            .find(|l| l.id == label_id)
            .map(|l| l.name.clone())
            .ok_or_else(|| AppError::external(format!("Unknown label id {label_id}")))?;
        for unit in &mut guard.units {
            if context_ids.contains(&unit.unit.context) {
                unit.labels.insert(name.clone());
            }
        }
        guard.bulk_calls.push((label_id, context_ids.to_vec()));
        Ok(())
    }

    async fn upload_translations(
        &self,
        _language_code_with_refset: &str,
        translations: &[UnitTranslation],
    ) -> AppResult<()> {
        lock(&self.state).uploads.extend_from_slice(translations);
        Ok(())
    }

    async fn get_create_label(
        &self,
        _project: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Label> {
        let mut guard = lock(&self.state);
        if guard.failing_labels.contains(name) {
            return Err(AppError::external(format!("Label creation failed: {name}")));
        }
        if let Some(label) = guard.labels.iter().find(|l| l.name == name) {
            return Ok(label.clone());
        }
        let label = Label {
            id: guard.labels.len() as i64 + 1,
            name: name.to_string(),
            description: description.to_string(),
            color: "blue".to_string(),
        };
        guard.labels.push(label.clone());
        Ok(label)
    }

    async fn get_label(&self, _project: &str, name: &str) -> AppResult<Option<Label>> {
        Ok(lock(&self.state)
            .labels
            .iter()
            .find(|l| l.name == name)
            .cloned())
    }

    async fn delete_label(&self, _project: &str, name: &str) -> AppResult<()> {
        let mut guard = lock(&self.state);
        guard.labels.retain(|l| l.name != name);
        for unit in &mut guard.units {
            unit.labels.remove(name);
        }
        Ok(())
    }

    async fn translation_exists(&self, language_code_with_refset: &str) -> AppResult<bool> {
        Ok(lock(&self.state)
            .translations
            .contains(language_code_with_refset))
    }

    fn web_url(&self) -> String {
        "https://platform.test".to_string()
    }
}

/// LLM that suggests `"{term} (n)"` for the n-th requested rank of every
/// term in the prompt, unless a scripted response is queued.
#[derive(Debug, Default)]
pub struct FakeLlm {
    scripted: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(String, bool)>>,
}

impl FakeLlm {
    /// LLM answering every term.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next call with `response` verbatim.
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.scripted).push_back(response.into());
    }

    /// Prompts received, with the fast-model flag.
    pub fn prompts(&self) -> Vec<(String, bool)> {
        lock(&self.prompts).clone()
    }

    fn answer(prompt: &str) -> String {
        let dual = prompt.contains("<translation1>|<translation2>");
        let terms = prompt
            .split_once("English terms:")
            .map(|(_, rest)| rest)
            .unwrap_or_default();
        terms
            .lines()
            .filter_map(|line| line.split_once('|'))
            .map(|(n, term)| {
                if dual {
                    format!("{n}|{term} (1)|{term} (2)")
                } else {
                    format!("{n}|{term} (1)")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn chat(&self, prompt: &str, use_fast_model: bool) -> AppResult<String> {
        lock(&self.prompts).push((prompt.to_string(), use_fast_model));
        if let Some(response) = lock(&self.scripted).pop_front() {
            return Ok(response);
        }
        Ok(Self::answer(prompt))
    }
}

/// Factory handing out shared fake clients and recording acting users.
#[derive(Debug, Clone)]
pub struct FakeClients {
    /// Terminology server.
    pub terminology: Arc<FakeTerminology>,
    /// Translation platform.
    pub platform: Arc<FakePlatform>,
    /// LLM.
    pub llm: Arc<FakeLlm>,
    acting_users: Arc<Mutex<Vec<String>>>,
}

impl FakeClients {
    /// Wrap the given fakes.
    pub fn new(terminology: FakeTerminology, platform: FakePlatform, llm: FakeLlm) -> Self {
        Self {
            terminology: Arc::new(terminology),
            platform: Arc::new(platform),
            llm: Arc::new(llm),
            acting_users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Users clients were created for, in order.
    pub fn acting_users(&self) -> Vec<String> {
        lock(&self.acting_users).clone()
    }
}

impl ClientFactory for FakeClients {
    fn terminology(
        &self,
        acting_user: &str,
        _selection_scope: &str,
    ) -> AppResult<Arc<dyn TerminologyClient>> {
        lock(&self.acting_users).push(acting_user.to_string());
        Ok(self.terminology.clone())
    }

    fn platform(&self, acting_user: &str) -> AppResult<Arc<dyn TranslationPlatformClient>> {
        lock(&self.acting_users).push(acting_user.to_string());
        Ok(self.platform.clone())
    }

    fn llm(&self) -> AppResult<Arc<dyn LlmClient>> {
        Ok(self.llm.clone())
    }
}
