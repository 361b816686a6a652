//! Event taxonomy: the ordered category list and per-form hints.

use indexmap::IndexMap;

use crate::error::Result;
use crate::pipeline::parser::Classifier;
use crate::types::config::PipelineConfig;

/// Hint used when a form type has no expected categories.
pub const VARIOUS_EVENTS: &str = "various events";

/// Ordered event categories plus the fallback and form-type hints.
#[derive(Debug, Clone)]
pub struct EventTaxonomy {
    categories: Vec<String>,
    fallback: String,
    expected: IndexMap<String, Vec<String>>,
    classifier: Classifier<String>,
}

impl EventTaxonomy {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let categories: Vec<String> = config
            .event_categories
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect();
        let classifier = Classifier::whole_words(
            categories.iter().map(|c| (c.clone(), c.clone())),
            config.fallback_category.clone(),
        )?;

        Ok(Self {
            categories,
            fallback: config.fallback_category.clone(),
            expected: config.expected_events.clone(),
            classifier,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First category (in taxonomy order) named as a whole word in `block`,
    /// or the fallback.
    pub fn classify(&self, block: &str) -> String {
        self.classifier.classify(block)
    }

    /// Categories a form type typically reports.
    pub fn expected_for(&self, form_type: &str) -> &[String] {
        self.expected
            .get(form_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Prompt hint: expected categories joined by ", ", or "various events".
    pub fn expected_hint(&self, form_type: &str) -> String {
        match self.expected_for(form_type) {
            [] => VARIOUS_EVENTS.to_string(),
            expected => expected.join(", "),
        }
    }

    /// Every category joined by ", ", for prompts.
    pub fn category_list(&self) -> String {
        self.categories.join(", ")
    }
}
