//! Immutable pipeline configuration.
//!
//! Built once at start-up (defaults, optionally overridden from JSON) and
//! shared by `Arc` with every component that needs it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::traits::gateway::TaskClass;

/// Sentinel section label used when a form type has no catalog.
pub const COMPLETE_DOCUMENT: &str = "complete_document";

/// Catch-all event category.
pub const OTHER_MATERIAL_EVENT: &str = "Other Material Event";

/// Hard character caps applied before text is sent to a model.
///
/// Caps count `char`s, not tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationLimits {
    /// Document text embedded in the summary prompt.
    pub summary_chars: usize,

    /// Section text embedded in each section prompt.
    pub section_chars: usize,

    /// Document text embedded in entity and event prompts.
    pub extraction_chars: usize,

    /// Outer cap on any complete prompt.
    pub prompt_chars: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            summary_chars: 50_000,
            section_chars: 50_000,
            extraction_chars: 25_000,
            prompt_chars: 100_000,
        }
    }
}

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub limits: TruncationLimits,

    /// Maximum historical extractions folded into one link prompt.
    ///
    /// Default: 10.
    pub history_window: usize,

    /// Event and link reply blocks shorter than this are dropped.
    ///
    /// Default: 20.
    pub min_block_chars: usize,

    /// Cap on the first-line fallback for entity names.
    ///
    /// Default: 50.
    pub entity_name_chars: usize,

    /// Form type → ordered section labels.
    ///
    /// Form types without an entry (or with an empty list) are analyzed as
    /// a single `complete_document` section.
    pub section_catalogs: IndexMap<String, Vec<String>>,

    /// Ordered event taxonomy; earlier categories win ties.
    pub event_categories: Vec<String>,

    /// Category assigned when no taxonomy entry matches.
    pub fallback_category: String,

    /// Form type → categories it typically reports (a prompt hint only).
    pub expected_events: IndexMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limits: TruncationLimits::default(),
            history_window: 10,
            min_block_chars: 20,
            entity_name_chars: 50,
            section_catalogs: default_section_catalogs(),
            event_categories: strings(&[
                "Management Change",
                "Acquisition/Merger",
                "Divestiture",
                "Financial Results",
                "Regulatory Issue",
                "Legal Settlement",
                "Stock Buyback",
                "Dividend Announcement",
                "Default/Bankruptcy",
                "Strategic Partnership",
                "Product Launch",
                "Restructuring",
                "Insider Trading",
                "Accounting Change",
                OTHER_MATERIAL_EVENT,
            ]),
            fallback_category: OTHER_MATERIAL_EVENT.to_string(),
            expected_events: default_expected_events(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the section catalog for one form type.
    pub fn with_section_catalog(
        mut self,
        form_type: impl Into<String>,
        labels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.section_catalogs
            .insert(form_type.into(), labels.into_iter().map(Into::into).collect());
        self
    }

    /// Set the history window.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Section labels for a form type (empty when none configured).
    pub fn section_catalog(&self, form_type: &str) -> &[String] {
        self.section_catalogs
            .get(form_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Typical event categories for a form type (empty when none configured).
    pub fn expected_events(&self, form_type: &str) -> &[String] {
        self.expected_events
            .get(form_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Task class → model slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTable {
    pub default: String,
    pub analysis: String,
    pub summarization: String,
    pub classification: String,
}

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            default: "mistralai/mistral-7b-instruct:free".to_string(),
            analysis: "microsoft/phi-3-medium-128k-instruct:free".to_string(),
            summarization: "google/gemini-2.0-pro-exp-02-05:free".to_string(),
            classification: "mistralai/mistral-7b-instruct:free".to_string(),
        }
    }
}

impl ModelTable {
    /// The model configured for a task class.
    pub fn model_for(&self, task: TaskClass) -> &str {
        match task {
            TaskClass::Default => &self.default,
            TaskClass::Analysis => &self.analysis,
            TaskClass::Summarization => &self.summarization,
            TaskClass::Classification => &self.classification,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_section_catalogs() -> IndexMap<String, Vec<String>> {
    let mut catalogs = IndexMap::new();
    catalogs.insert(
        "8-K".to_string(),
        strings(&[
            "Item 1.01", "Item 1.02", "Item 1.03", "Item 2.01", "Item 2.02", "Item 2.03",
            "Item 2.05", "Item 2.06", "Item 3.01", "Item 3.02", "Item 4.01", "Item 4.02",
            "Item 5.01", "Item 5.02", "Item 5.03", "Item 5.07", "Item 7.01", "Item 8.01",
            "Item 9.01",
        ]),
    );
    catalogs.insert(
        "10-K".to_string(),
        strings(&[
            "Item 1.", "Item 1A.", "Item 1B.", "Item 2.", "Item 3.", "Item 5.", "Item 7.",
            "Item 7A.", "Item 8.", "Item 9A.",
        ]),
    );
    catalogs.insert(
        "10-Q".to_string(),
        strings(&["Item 1.", "Item 1A.", "Item 2.", "Item 3.", "Item 4.", "Item 5.", "Item 6."]),
    );
    catalogs
}

fn default_expected_events() -> IndexMap<String, Vec<String>> {
    let mut expected = IndexMap::new();
    expected.insert(
        "8-K".to_string(),
        strings(&[
            "Management Change",
            "Acquisition/Merger",
            "Financial Results",
            "Legal Settlement",
            "Default/Bankruptcy",
        ]),
    );
    expected.insert(
        "10-Q".to_string(),
        strings(&["Financial Results", "Regulatory Issue", "Legal Settlement"]),
    );
    expected.insert(
        "10-K".to_string(),
        strings(&["Financial Results", "Risk Factors Update", "Accounting Change"]),
    );
    expected.insert("4".to_string(), strings(&["Insider Trading"]));
    expected.insert("13D".to_string(), strings(&["Significant Ownership Change"]));
    expected
}
