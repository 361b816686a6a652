//! Entity extraction and cross-filing link results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::DocumentMetadata;

/// One entity mentioned in a filing, as parsed from model output.
///
/// Entities are neither deduplicated nor normalized; downstream identity is
/// the exact `name` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,

    /// Free-form kind ("company", "person", ...). Default "unknown".
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Default "mentioned".
    pub role: String,

    /// The verbatim reply block the record was parsed from.
    pub context: String,
}

/// Entities extracted from one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(flatten)]
    pub filing: DocumentMetadata,

    /// Raw model reply the entities were parsed from.
    pub extracted_text: String,

    pub raw_entities: Vec<EntityRecord>,

    pub extraction_timestamp: DateTime<Utc>,
}

impl ExtractionResult {
    pub fn filing_id(&self) -> &str {
        self.filing.filing_id()
    }

    /// Entity names only, in extraction order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.raw_entities.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Keyword-derived weight of a cross-filing link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Low,
    #[default]
    Medium,
    High,
}

/// A relationship between current-filing entities and historical ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The verbatim reply block.
    pub description: String,

    /// Only names the model explicitly labeled; possibly empty.
    pub entities_involved: Vec<String>,

    /// Default "related".
    pub relationship_type: String,

    pub significance: Significance,
}

/// Links found for one filing against its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkResult {
    pub filing_id: String,

    pub links: Vec<LinkRecord>,

    /// Raw correlation reply; empty when no call was made.
    pub link_text: String,

    /// Current-filing entities, echoed.
    pub new_entities: Vec<EntityRecord>,

    pub link_timestamp: DateTime<Utc>,
}
