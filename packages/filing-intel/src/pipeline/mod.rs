//! The analysis pipeline.
//!
//! The pipeline covers:
//! - Section extraction per form-type catalog
//! - Summary → concurrent section analyses → assessment
//! - Free-text reply parsing into entity, event and link records
//! - Event taxonomy classification
//! - Cross-filing entity linking
//! - End-to-end processing with persistence

pub mod analyzer;
pub mod entities;
pub mod events;
pub mod invoke;
pub mod parser;
pub mod processor;
pub mod prompts;
pub mod sections;
pub mod taxonomy;

pub use analyzer::FilingAnalyzer;
pub use entities::{EntityLinker, EntitySchema, LinkSchema};
pub use events::{EventDetector, EventSchema};
pub use invoke::invoke;
pub use parser::{parse_blocks, split_blocks, Classifier, FieldSpec, RecordSchema, ValueShape};
pub use processor::{AnalysisMode, FilingProcessor, ProcessingReport};
pub use prompts::{render, render_within, truncate_chars, truncate_with_marker, SYSTEM_PROMPT, TRUNCATION_MARKER};
pub use sections::SectionExtractor;
pub use taxonomy::EventTaxonomy;
