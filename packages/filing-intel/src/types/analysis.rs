//! Filing analysis results.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::metadata::{DocumentMetadata, IssuerInfo};

/// Section label → section text, iterated in catalog order.
///
/// A label missing from the map means the section was not found in the
/// document. A label present with empty text means it was found but empty.
pub type SectionMap = IndexMap<String, String>;

/// Model analysis of one extracted section.
///
/// Failed calls are kept (with `success == false`) so callers can see
/// coverage gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub section: String,

    /// Model output; empty when the call failed.
    pub analysis: String,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SectionAnalysis {
    pub fn succeeded(section: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            analysis: analysis.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(section: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            analysis: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Consolidated analysis of one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingAnalysis {
    #[serde(flatten)]
    pub filing: DocumentMetadata,

    /// Issuer enrichment, when a provider returned any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_info: Option<IssuerInfo>,

    pub summary: String,

    /// Catalog order, not completion order.
    pub section_analyses: Vec<SectionAnalysis>,

    pub overall_assessment: String,

    pub analysis_timestamp: DateTime<Utc>,

    /// Summary call succeeded AND assessment call succeeded. Section
    /// failures are reported per section and do not affect this flag.
    pub analysis_success: bool,
}

impl FilingAnalysis {
    pub fn filing_id(&self) -> &str {
        self.filing.filing_id()
    }

    /// Sections whose model call failed.
    pub fn failed_sections(&self) -> impl Iterator<Item = &SectionAnalysis> {
        self.section_analyses.iter().filter(|s| !s.success)
    }
}
