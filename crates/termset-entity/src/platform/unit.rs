//! Translation units and pages of them.

use serde::{Deserialize, Serialize};

/// One translatable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Platform id.
    pub id: i64,
    /// Source text, one entry per plural form.
    #[serde(default)]
    pub source: Vec<String>,
    /// Target text, one entry per plural form.
    #[serde(default)]
    pub target: Vec<String>,
    /// Context key; the concept id.
    pub context: String,
    /// Platform state code.
    #[serde(default)]
    pub state: i32,
    /// Labels on this unit.
    #[serde(default)]
    pub labels: Vec<serde_json::Value>,
}

impl Unit {
    /// Source text when the unit has exactly one segment.
    pub fn single_source(&self) -> Option<&str> {
        match self.source.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// One page of a paginated platform listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPage<T> {
    /// Total number of matching items across all pages.
    pub count: u64,
    /// URL of the next page, absent on the last page.
    pub next: Option<String>,
    /// URL of the previous page.
    pub previous: Option<String>,
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> UnitPage<T> {
    /// Whether the platform reports a further page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Suggested translations for one unit, keyed by context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTranslation {
    /// Context key of the target unit.
    pub context: String,
    /// Ranked suggestions, best first.
    pub suggestions: Vec<String>,
}
