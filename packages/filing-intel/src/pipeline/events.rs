//! Event detection.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::pipeline::invoke::invoke;
use crate::pipeline::parser::{parse_blocks, FieldSpec, RecordSchema};
use crate::pipeline::prompts::{render_within, truncate_chars, EVENT_PROMPT};
use crate::pipeline::taxonomy::EventTaxonomy;
use crate::traits::gateway::{ModelGateway, TaskClass};
use crate::types::{
    analysis::FilingAnalysis,
    config::PipelineConfig,
    event::{EventRecord, EventResult},
    metadata::DocumentMetadata,
};

static NO_EVENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no significant events|no events detected").unwrap());

/// Field rules for event blocks.
#[derive(Debug, Clone)]
pub struct EventSchema {
    taxonomy: EventTaxonomy,
    entities: FieldSpec,
    financial_impact: FieldSpec,
    market_impact: FieldSpec,
    risk_level: FieldSpec,
    min_chars: usize,
}

impl EventSchema {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            taxonomy: EventTaxonomy::new(config)?,
            entities: FieldSpec::phrase(
                &[
                    "entities involved",
                    "entities",
                    "entity",
                    "company",
                    "person",
                    "organization",
                ],
                "",
            )?,
            financial_impact: FieldSpec::word(
                &["financial impact assessment", "financial impact"],
                "Unknown",
            )?,
            market_impact: FieldSpec::word(&["market impact potential", "market impact"], "Unknown")?,
            risk_level: FieldSpec::word(&["risk level"], "Medium")?,
            min_chars: config.min_block_chars,
        })
    }

    pub fn taxonomy(&self) -> &EventTaxonomy {
        &self.taxonomy
    }
}

impl RecordSchema for EventSchema {
    type Record = EventRecord;

    fn empty_marker(&self) -> Option<&Regex> {
        Some(&NO_EVENTS)
    }

    fn min_block_chars(&self) -> usize {
        self.min_chars
    }

    fn build(&self, block: &str) -> EventRecord {
        EventRecord {
            description: block.to_string(),
            category: self.taxonomy.classify(block),
            entities_involved: self.entities.extract_all(block),
            financial_impact: self.financial_impact.extract(block),
            market_impact: self.market_impact.extract(block),
            risk_level: self.risk_level.extract(block),
        }
    }
}

/// Detects material events in a filing.
pub struct EventDetector<G: ModelGateway> {
    gateway: G,
    config: Arc<PipelineConfig>,
    schema: EventSchema,
}

impl<G: ModelGateway> EventDetector<G> {
    pub fn new(gateway: G, config: Arc<PipelineConfig>) -> Result<Self> {
        Ok(Self {
            schema: EventSchema::new(&config)?,
            gateway,
            config,
        })
    }

    pub fn taxonomy(&self) -> &EventTaxonomy {
        self.schema.taxonomy()
    }

    /// Detect events, optionally using a prior analysis of the same filing
    /// as extra context.
    pub async fn detect(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        prior: Option<&FilingAnalysis>,
    ) -> Result<EventResult> {
        metadata.validate()?;
        let taxonomy = self.schema.taxonomy();

        let context = prior.map(analysis_context).unwrap_or_default();
        let expected = taxonomy.expected_hint(metadata.filing_type());
        let categories = taxonomy.category_list();
        let prompt = render_within(
            EVENT_PROMPT,
            &[
                ("filing_type", metadata.filing_type()),
                ("text", truncate_chars(text, self.config.limits.extraction_chars)),
                ("analysis_context", context.as_str()),
                ("expected_events", expected.as_str()),
                ("categories", categories.as_str()),
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
        let events = parse_blocks(reply.text(), &self.schema);
        let result = EventResult::new(metadata.clone(), events);

        info!(
            filing_id = metadata.filing_id(),
            events = result.event_count,
            critical = result.has_critical_events,
            high_impact = result.has_high_impact_events,
            success = reply.is_success(),
            "Event detection complete"
        );
        Ok(result)
    }
}

/// Summary and assessment of a prior analysis, or nothing if it has no
/// summary.
fn analysis_context(analysis: &FilingAnalysis) -> String {
    if analysis.summary.trim().is_empty() {
        return String::new();
    }
    format!(
        "\nFiling Summary:\n{}\n\nOverall Assessment:\n{}\n",
        analysis.summary, analysis.overall_assessment
    )
}
