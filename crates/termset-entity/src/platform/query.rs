//! Unit search query builder.

use crate::{PLATFORM_COMPONENT, PLATFORM_PROJECT};

/// Filter, paging and sort options for a unit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitQuery {
    project: String,
    component: String,
    language: String,
    label: Option<String>,
    state: Option<String>,
    page: u32,
    page_size: u32,
    fastest_sort: bool,
}

impl UnitQuery {
    /// Query over the shared project and component in one language slug.
    pub fn new(language_code_with_refset: impl Into<String>) -> Self {
        Self {
            project: PLATFORM_PROJECT.to_string(),
            component: PLATFORM_COMPONENT.to_string(),
            language: language_code_with_refset.into(),
            label: None,
            state: None,
            page: 1,
            page_size: 100,
            fastest_sort: true,
        }
    }

    /// Restrict to units carrying `label`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Restrict to units in `state`, e.g. `empty` or `translated`.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// 1-based page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Items per page.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sort by id so paging is stable while unrelated fields change.
    pub fn fastest_sort(mut self, enabled: bool) -> Self {
        self.fastest_sort = enabled;
        self
    }

    /// Translation slug the query runs in.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Label filter, if any.
    pub fn label_filter(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// State filter, if any.
    pub fn state_filter(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Current page number.
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Current page size.
    pub fn current_page_size(&self) -> u32 {
        self.page_size
    }

    /// Search expression for the `q` parameter.
    pub fn search_expression(&self) -> String {
        let mut q = format!(
            "project:{} AND component:{} AND language:{}",
            self.project, self.component, self.language
        );
        if let Some(label) = &self.label {
            q.push_str(&format!(" AND label:{label}"));
        }
        if let Some(state) = &self.state {
            q.push_str(&format!(" AND state:{state}"));
        }
        q
    }

    /// Query-string pairs for the unit listing endpoint.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.search_expression()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("format", "json".to_string()),
        ];
        if self.fastest_sort {
            params.push(("sort_by", "id".to_string()));
        }
        params
    }
}
