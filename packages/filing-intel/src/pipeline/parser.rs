//! Free-text reply → typed records.
//!
//! Model replies are untrusted prose that only loosely follows the list
//! format the prompt asked for. Parsing here is best-effort and total:
//! every field has a default, and no input makes it fail.
//!
//! The shape is shared by entity, event and link extraction:
//! 1. Split the reply into blocks at list markers (`1.`, `*`, `-`).
//! 2. Drop blank (and, per schema, too-short) blocks.
//! 3. Build one record per block from labeled fields (`Label: value`),
//!    keyword classifiers and defaults.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// A line starting (after indentation) with a list marker followed by
/// whitespace or the end of the line.
static BLOCK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\d+\.|\*|-)(?:[ \t]+|$)").unwrap());

/// Separator between a field label and its value: a colon, optionally
/// wrapped in markdown emphasis. Hyphenated prose ("company-wide") is not a
/// label.
const SEPARATOR: &str = r"[ \t*_]*:[ \t*_]*";

/// Per-record-type parsing rules.
pub trait RecordSchema {
    type Record;

    /// A reply matching this pattern anywhere means "nothing found".
    fn empty_marker(&self) -> Option<&Regex> {
        None
    }

    /// Blocks with fewer characters than this are dropped.
    fn min_block_chars(&self) -> usize {
        1
    }

    /// Build one record from one non-empty, trimmed block.
    fn build(&self, block: &str) -> Self::Record;
}

/// Parse a reply into records using `schema`.
pub fn parse_blocks<S: RecordSchema>(text: &str, schema: &S) -> Vec<S::Record> {
    if schema
        .empty_marker()
        .is_some_and(|marker| marker.is_match(text))
    {
        return Vec::new();
    }

    let min_chars = schema.min_block_chars();
    split_blocks(text)
        .filter(|block| block.chars().count() >= min_chars)
        .map(|block| schema.build(block))
        .collect()
}

/// Split a reply into trimmed, non-empty blocks.
///
/// Text before the first marker is a block of its own; a reply without any
/// marker is a single block.
pub fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    BLOCK_MARKER
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// First line of a block, capped at `max_chars` characters.
pub fn first_line(block: &str, max_chars: usize) -> String {
    let line = block.lines().next().unwrap_or_default().trim();
    line.chars().take(max_chars).collect()
}

/// What a labeled field's value looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Everything up to the next comma or line break, trimmed.
    Phrase,

    /// A single word, capitalized ("HIGH" → "High").
    Word,
}

/// A labeled field: label alternatives in priority order plus a default.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    patterns: Vec<Regex>,
    default: String,
    shape: ValueShape,
}

impl FieldSpec {
    /// Phrase-valued field.
    pub fn phrase(labels: &[&str], default: impl Into<String>) -> Result<Self> {
        Self::new(labels, default, ValueShape::Phrase)
    }

    /// Single-word field, capitalized on extraction.
    pub fn word(labels: &[&str], default: impl Into<String>) -> Result<Self> {
        Self::new(labels, default, ValueShape::Word)
    }

    fn new(labels: &[&str], default: impl Into<String>, shape: ValueShape) -> Result<Self> {
        let value = match shape {
            ValueShape::Phrase => r"([^,\n]+)",
            ValueShape::Word => r"(\w+)",
        };
        let patterns = labels
            .iter()
            .map(|label| {
                let label = label
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+");
                RegexBuilder::new(&format!(r"\b{}{}{}", label, SEPARATOR, value))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            default: default.into(),
            shape,
        })
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Value for the first label (in declaration order) present in `block`.
    pub fn find(&self, block: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(block)
                .filter_map(|caps| caps.get(1))
                .find_map(|m| self.clean(m.as_str()))
        })
    }

    /// Value for the first matching label, or the default.
    pub fn extract(&self, block: &str) -> String {
        self.find(block).unwrap_or_else(|| self.default.clone())
    }

    /// Every labeled value in `block`, in text order.
    pub fn extract_all(&self, block: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = self
            .patterns
            .iter()
            .flat_map(|pattern| pattern.captures_iter(block))
            .filter_map(|caps| {
                let m = caps.get(1)?;
                Some((m.start(), self.clean(m.as_str())?))
            })
            .collect();
        found.sort_by_key(|(start, _)| *start);
        found.dedup_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, value)| value).collect()
    }

    fn clean(&self, raw: &str) -> Option<String> {
        let value = raw.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_');
        if value.is_empty() {
            return None;
        }
        Some(match self.shape {
            ValueShape::Phrase => value.to_string(),
            ValueShape::Word => capitalize(value),
        })
    }
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Ordered pattern rules; the first rule matching a block wins.
#[derive(Debug, Clone)]
pub struct Classifier<T> {
    rules: Vec<(Regex, T)>,
    default: T,
}

impl<T: Clone> Classifier<T> {
    /// Rules that fire when any keyword occurs anywhere in the block
    /// (case-insensitive substring match).
    pub fn keywords(rules: &[(&[&str], T)], default: T) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(words, label)| -> Result<(Regex, T)> {
                let alternation = words
                    .iter()
                    .map(|w| regex::escape(w))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = RegexBuilder::new(&alternation)
                    .case_insensitive(true)
                    .build()?;
                Ok((pattern, label.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules, default })
    }

    /// Rules that fire when the phrase occurs as a whole word
    /// (case-insensitive).
    pub fn whole_words(rules: impl IntoIterator<Item = (String, T)>, default: T) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|(phrase, label)| -> Result<(Regex, T)> {
                let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&phrase)))
                    .case_insensitive(true)
                    .build()?;
                Ok((pattern, label))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules, default })
    }

    pub fn classify(&self, block: &str) -> T {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(block))
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Lines;

    impl RecordSchema for Lines {
        type Record = String;

        fn build(&self, block: &str) -> String {
            block.to_string()
        }
    }

    struct LongLines;

    impl RecordSchema for LongLines {
        type Record = String;

        fn empty_marker(&self) -> Option<&Regex> {
            static MARKER: LazyLock<Regex> =
                LazyLock::new(|| Regex::new(r"(?i)nothing found").unwrap());
            Some(&MARKER)
        }

        fn min_block_chars(&self) -> usize {
            20
        }

        fn build(&self, block: &str) -> String {
            block.to_string()
        }
    }

    #[test]
    fn test_split_on_numbered_star_and_dash_markers() {
        let text = "Intro line\n1. First block\n  * Second block\n- Third block\n";
        let blocks: Vec<_> = split_blocks(text).collect();
        assert_eq!(blocks, vec!["Intro line", "First block", "Second block", "Third block"]);
    }

    #[test]
    fn test_marker_needs_trailing_whitespace() {
        let text = "1.5 billion in revenue\n-negative outlook\n**bold** line";
        let blocks: Vec<_> = split_blocks(text).collect();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_inline_hyphen_does_not_split() {
        let blocks: Vec<_> = split_blocks("Coca-Cola - a beverage company").collect();
        assert_eq!(blocks, vec!["Coca-Cola - a beverage company"]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(parse_blocks("", &Lines).is_empty());
        assert!(parse_blocks("   \n\t  ", &Lines).is_empty());
        assert_eq!(parse_blocks("just prose, no markers", &Lines).len(), 1);
        assert!(parse_blocks("1. \n2. \n- ", &Lines).is_empty());
    }

    #[test]
    fn test_min_length_filter() {
        let text = "1. short\n2. this block is definitely long enough";
        let records = parse_blocks(text, &LongLines);
        assert_eq!(records, vec!["this block is definitely long enough"]);
    }

    #[test]
    fn test_empty_marker_short_circuits() {
        let text = "1. this block is definitely long enough\nNothing found in the rest.";
        assert!(parse_blocks(text, &LongLines).is_empty());
    }

    #[test]
    fn test_field_first_label_wins_over_position() {
        let spec = FieldSpec::phrase(&["name", "company"], "none").unwrap();
        let block = "Company: Apple Inc., Name: Tim Cook";
        assert_eq!(spec.extract(block), "Tim Cook");
    }

    #[test]
    fn test_field_value_stops_at_comma_and_newline() {
        let spec = FieldSpec::phrase(&["role"], "mentioned").unwrap();
        assert_eq!(spec.extract("Role: General Counsel, Secretary"), "General Counsel");
        assert_eq!(spec.extract("ROLE:  executive\nmore"), "executive");
    }

    #[test]
    fn test_field_handles_markdown_emphasis() {
        let spec = FieldSpec::phrase(&["type"], "unknown").unwrap();
        assert_eq!(spec.extract("**Type:** Company"), "Company");
        assert_eq!(spec.extract("**Type**: person"), "person");
    }

    #[test]
    fn test_field_default_when_absent_or_blank() {
        let spec = FieldSpec::phrase(&["type"], "unknown").unwrap();
        assert_eq!(spec.extract("no labels here"), "unknown");
        assert_eq!(spec.extract("Type: **"), "unknown");
    }

    #[test]
    fn test_label_needs_word_boundary_and_separator() {
        let spec = FieldSpec::phrase(&["name"], "none").unwrap();
        assert_eq!(spec.extract("Surname: Adams"), "none");
        assert_eq!(spec.extract("the name of the company"), "none");
    }

    #[test]
    fn test_multi_word_label_tolerates_spacing() {
        let spec = FieldSpec::word(&["risk level"], "Medium").unwrap();
        assert_eq!(spec.extract("Risk   Level: CRITICAL"), "Critical");
        assert_eq!(spec.extract("risk level **:** high"), "High");
        assert_eq!(spec.extract("the risk level is unclear"), "Medium");
        assert_eq!(spec.extract("risk level - high"), "Medium");
    }

    #[test]
    fn test_hyphenated_words_are_not_labels() {
        let spec = FieldSpec::phrase(&["company", "person", "organization", "entity"], "").unwrap();
        assert!(spec.find("company-wide layoffs affecting staff").is_none());
        assert!(spec.extract_all("Company-owned unit, person-to-person sales").is_empty());
        assert!(spec.extract_all("an entity-level control and an organization-wide review").is_empty());
    }

    #[test]
    fn test_marker_on_its_own_line_starts_block() {
        let text = "1.\nManagement Change at the company\n-\nSecond block here";
        let blocks: Vec<_> = split_blocks(text).collect();
        assert_eq!(blocks, vec!["Management Change at the company", "Second block here"]);
    }

    #[test]
    fn test_extract_all_in_text_order() {
        let spec = FieldSpec::phrase(&["person", "company"], "").unwrap();
        let block = "Company: Apple Inc.\nPerson: Katherine Adams\nPerson: Kate Andrias";
        assert_eq!(
            spec.extract_all(block),
            vec!["Apple Inc.", "Katherine Adams", "Kate Andrias"]
        );
        assert!(spec.extract_all("no labels").is_empty());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hIGH"), "High");
        assert_eq!(capitalize("critical"), "Critical");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_keyword_classifier_order_and_default() {
        let high: &[&str] = &["major", "critical"];
        let low: &[&str] = &["minor"];
        let classifier = Classifier::keywords(&[(high, "high"), (low, "low")], "medium").unwrap();
        assert_eq!(classifier.classify("A MAJOR shift"), "high");
        assert_eq!(classifier.classify("minor but critical"), "high");
        assert_eq!(classifier.classify("a minor note"), "low");
        assert_eq!(classifier.classify("nothing notable"), "medium");
    }

    #[test]
    fn test_whole_word_classifier() {
        let classifier = Classifier::whole_words(
            vec![
                ("Acquisition/Merger".to_string(), 1),
                ("Restructuring".to_string(), 2),
            ],
            0,
        )
        .unwrap();
        assert_eq!(classifier.classify("an acquisition/merger closed"), 1);
        assert_eq!(classifier.classify("restructurings continue"), 0);
        assert_eq!(classifier.classify("Restructuring."), 2);
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(text in "\\PC*") {
            let _ = parse_blocks(&text, &Lines);
            let _ = parse_blocks(&text, &LongLines);
        }

        #[test]
        fn prop_blocks_are_substrings(text in "[a-z0-9 .*\\-\n]{0,200}") {
            for block in split_blocks(&text) {
                prop_assert!(text.contains(block));
                prop_assert!(!block.trim().is_empty());
            }
        }

        #[test]
        fn prop_fields_never_panic(text in "\\PC*") {
            let spec = FieldSpec::word(&["risk level"], "Medium").unwrap();
            let _ = spec.extract(&text);
            let _ = spec.extract_all(&text);
        }
    }
}
