//! Entity extraction and cross-filing linking.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::invoke::invoke;
use crate::pipeline::parser::{first_line, parse_blocks, Classifier, FieldSpec, RecordSchema};
use crate::pipeline::prompts::{render_within, truncate_chars, ENTITY_PROMPT, LINK_PROMPT};
use crate::traits::gateway::{ModelGateway, TaskClass};
use crate::types::{
    config::PipelineConfig,
    entity::{EntityRecord, ExtractionResult, LinkRecord, LinkResult, Significance},
    metadata::DocumentMetadata,
};

static NO_ENTITIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no significant entities|no entities (?:were )?(?:detected|found|identified)")
        .unwrap()
});

static NO_LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)no (?:meaningful|significant) (?:connections|links|relationships)|no (?:connections|links|relationships) (?:were )?(?:detected|found|identified)",
    )
    .unwrap()
});

/// Field rules for entity blocks.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: FieldSpec,
    entity_type: FieldSpec,
    role: FieldSpec,
    name_chars: usize,
}

impl EntitySchema {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            name: FieldSpec::phrase(&["entity", "name", "company", "person"], "")?,
            entity_type: FieldSpec::phrase(&["type", "category"], "unknown")?,
            role: FieldSpec::phrase(&["role", "function", "position"], "mentioned")?,
            name_chars: config.entity_name_chars,
        })
    }
}

impl RecordSchema for EntitySchema {
    type Record = EntityRecord;

    fn empty_marker(&self) -> Option<&Regex> {
        Some(&NO_ENTITIES)
    }

    fn build(&self, block: &str) -> EntityRecord {
        EntityRecord {
            name: self
                .name
                .find(block)
                .unwrap_or_else(|| first_line(block, self.name_chars)),
            entity_type: self.entity_type.extract(block),
            role: self.role.extract(block),
            context: block.to_string(),
        }
    }
}

/// Field rules for link blocks.
#[derive(Debug, Clone)]
pub struct LinkSchema {
    entities: FieldSpec,
    relationship: FieldSpec,
    significance: Classifier<Significance>,
    min_chars: usize,
}

impl LinkSchema {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let high: &[&str] = &["significant", "important", "critical", "major"];
        let low: &[&str] = &["minor", "small", "slight"];
        Ok(Self {
            entities: FieldSpec::phrase(&["entity", "company", "person", "organization"], "")?,
            relationship: FieldSpec::phrase(&["relationship", "connection", "link"], "related")?,
            significance: Classifier::keywords(
                &[(high, Significance::High), (low, Significance::Low)],
                Significance::Medium,
            )?,
            min_chars: config.min_block_chars,
        })
    }
}

impl RecordSchema for LinkSchema {
    type Record = LinkRecord;

    fn empty_marker(&self) -> Option<&Regex> {
        Some(&NO_LINKS)
    }

    fn min_block_chars(&self) -> usize {
        self.min_chars
    }

    fn build(&self, block: &str) -> LinkRecord {
        LinkRecord {
            description: block.to_string(),
            entities_involved: self.entities.extract_all(block),
            relationship_type: self.relationship.extract(block),
            significance: self.significance.classify(block),
        }
    }
}

/// Extracts entities from filings and links them to earlier filings.
pub struct EntityLinker<G: ModelGateway> {
    gateway: G,
    config: Arc<PipelineConfig>,
    entities: EntitySchema,
    links: LinkSchema,
}

impl<G: ModelGateway> EntityLinker<G> {
    pub fn new(gateway: G, config: Arc<PipelineConfig>) -> Result<Self> {
        Ok(Self {
            entities: EntitySchema::new(&config)?,
            links: LinkSchema::new(&config)?,
            gateway,
            config,
        })
    }

    /// Extract named entities from a filing.
    ///
    /// A failed model call yields an empty extraction rather than an error.
    pub async fn extract(&self, text: &str, metadata: &DocumentMetadata) -> Result<ExtractionResult> {
        metadata.validate()?;

        let prompt = render_within(
            ENTITY_PROMPT,
            &[("text", truncate_chars(text, self.config.limits.extraction_chars))],
            self.config.limits.prompt_chars,
        );
        let reply = invoke(
            &self.gateway,
            &prompt,
            TaskClass::Analysis,
            self.config.limits.prompt_chars,
        )
        .await;

        let raw_entities = parse_blocks(reply.text(), &self.entities);
        info!(
            filing_id = metadata.filing_id(),
            entities = raw_entities.len(),
            success = reply.is_success(),
            "Entity extraction complete"
        );

        Ok(ExtractionResult {
            filing: metadata.clone(),
            extracted_text: reply.into_text(),
            raw_entities,
            extraction_timestamp: Utc::now(),
        })
    }

    /// Correlate the current filing's entities with historical extractions.
    ///
    /// History is used in the order given; only the first
    /// `history_window` entries are sent. Empty history makes no model call.
    pub async fn link(
        &self,
        current: &ExtractionResult,
        history: &[ExtractionResult],
    ) -> Result<LinkResult> {
        if history.is_empty() {
            debug!(filing_id = current.filing_id(), "No history, skipping link call");
            return Ok(LinkResult {
                filing_id: current.filing_id().to_string(),
                links: Vec::new(),
                link_text: String::new(),
                new_entities: current.raw_entities.clone(),
                link_timestamp: Utc::now(),
            });
        }

        let history_block = history
            .iter()
            .take(self.config.history_window)
            .map(describe_history)
            .collect::<Result<Vec<_>>>()?
            .join("\n\n");
        let entities = serde_json::to_string_pretty(&current.raw_entities)?;
        let filing = &current.filing;
        let filing_date = filing.filing_date().to_string();

        let prompt = render_within(
            LINK_PROMPT,
            &[
                ("filing_id", filing.filing_id()),
                ("filing_date", filing_date.as_str()),
                ("filing_type", filing.filing_type()),
                ("company_name", filing.company_name()),
                ("cik", filing.cik()),
                ("entities", entities.as_str()),
                ("history", history_block.as_str()),
            ],
            self.config.limits.prompt_chars,
        );
        let reply = invoke(
            &self.gateway,
            &prompt,
            TaskClass::Analysis,
            self.config.limits.prompt_chars,
        )
        .await;

        let links = parse_blocks(reply.text(), &self.links);
        info!(
            filing_id = current.filing_id(),
            history = history.len().min(self.config.history_window),
            links = links.len(),
            success = reply.is_success(),
            "Entity linking complete"
        );

        Ok(LinkResult {
            filing_id: current.filing_id().to_string(),
            links,
            link_text: reply.into_text(),
            new_entities: current.raw_entities.clone(),
            link_timestamp: Utc::now(),
        })
    }
}

/// One historical filing as identity plus entity names only.
fn describe_history(past: &ExtractionResult) -> Result<String> {
    let filing = &past.filing;
    Ok(format!(
        "Filing ID: {}, Date: {}, Type: {}\nCompany: {} (CIK: {})\nEntities: {}",
        filing.filing_id(),
        filing.filing_date(),
        filing.filing_type(),
        filing.company_name(),
        filing.cik(),
        serde_json::to_string(&past.entity_names())?,
    ))
}
