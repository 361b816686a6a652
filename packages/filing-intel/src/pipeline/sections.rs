//! Section extraction.
//!
//! Splits a filing into named sections using the catalog configured for
//! its form type. Each label is matched case-insensitively; its section
//! runs from just after the label to the earliest occurrence of any other
//! label in the catalog (or the end of the document).
//!
//! Matchers are compiled once, when the extractor is built.

use std::collections::HashMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::Result;
use crate::types::analysis::SectionMap;
use crate::types::config::{PipelineConfig, COMPLETE_DOCUMENT};

/// Compiled matchers for one catalog label.
#[derive(Debug, Clone)]
struct LabelMatcher {
    label: String,
    pattern: Regex,
    /// Any other label of the same catalog; `None` for single-label catalogs.
    boundary: Option<Regex>,
}

/// Splits documents into catalog sections.
#[derive(Debug, Clone, Default)]
pub struct SectionExtractor {
    catalogs: HashMap<String, Vec<LabelMatcher>>,
}

impl SectionExtractor {
    /// Compile matchers for every catalog in `config`.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut catalogs = HashMap::new();
        for (form_type, labels) in &config.section_catalogs {
            let labels: Vec<&String> = labels.iter().filter(|l| !l.trim().is_empty()).collect();
            if labels.is_empty() {
                continue;
            }

            let sources: Vec<String> = labels.iter().map(|l| label_source(l)).collect();
            let mut matchers = Vec::with_capacity(labels.len());
            for (i, label) in labels.iter().enumerate() {
                let others: Vec<&str> = sources
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, s)| s.as_str())
                    .collect();
                let boundary = if others.is_empty() {
                    None
                } else {
                    Some(compile(&others.join("|"))?)
                };
                matchers.push(LabelMatcher {
                    label: label.to_string(),
                    pattern: compile(&sources[i])?,
                    boundary,
                });
            }
            catalogs.insert(form_type.clone(), matchers);
        }
        Ok(Self { catalogs })
    }

    /// Split `text` into sections for `form_type`.
    ///
    /// Form types without a catalog yield one `complete_document` section
    /// holding the whole text. Otherwise the map follows catalog order and
    /// labels that do not occur are absent.
    pub fn extract(&self, text: &str, form_type: &str) -> SectionMap {
        let mut sections = SectionMap::new();

        let Some(matchers) = self.catalogs.get(form_type) else {
            sections.insert(COMPLETE_DOCUMENT.to_string(), text.to_string());
            return sections;
        };

        for (label, span) in locate(matchers, text) {
            sections.insert(label.to_string(), text[span].trim().to_string());
        }

        debug!(
            form_type,
            catalog = matchers.len(),
            found = sections.len(),
            "Extracted sections"
        );
        sections
    }

    /// Whether a catalog is configured for `form_type`.
    pub fn has_catalog(&self, form_type: &str) -> bool {
        self.catalogs.contains_key(form_type)
    }
}

/// Byte span of each label's section, in catalog order.
fn locate<'a>(matchers: &'a [LabelMatcher], text: &str) -> Vec<(&'a str, Range<usize>)> {
    matchers
        .iter()
        .filter_map(|matcher| {
            let start = matcher.pattern.find(text)?.end();
            let end = matcher
                .boundary
                .as_ref()
                .and_then(|b| b.find(&text[start..]))
                .map(|m| start + m.start())
                .unwrap_or(text.len());
            Some((matcher.label.as_str(), start..end))
        })
        .collect()
}

/// Regex source for a label.
///
/// Whitespace inside the label matches any run of whitespace. A label
/// ending in a word character must not run into a longer label
/// ("Item 2" does not match "Item 2.02"); one trailing period is allowed.
fn label_source(label: &str) -> String {
    let body = label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let ends_in_word = label
        .trim_end()
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric());
    if ends_in_word {
        format!(r"(?:{}\.?(?:[^\w.]|$))", body)
    } else {
        format!("(?:{})", body)
    }
}

fn compile(source: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(source).case_insensitive(true).build()?)
}
