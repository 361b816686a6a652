//! Detected filing events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::DocumentMetadata;

/// Risk level value that marks an event as critical.
pub const CRITICAL_RISK: &str = "Critical";

/// Market impact value that marks an event as high impact.
pub const HIGH_IMPACT: &str = "High";

/// One event parsed from model output.
///
/// Impact and risk fields are single capitalized words as the model wrote
/// them ("High", "Critical", ...), or their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub description: String,

    /// A taxonomy category; default "Other Material Event".
    pub category: String,

    pub entities_involved: Vec<String>,

    /// Default "Unknown".
    pub financial_impact: String,

    /// Default "Unknown".
    pub market_impact: String,

    /// Default "Medium".
    pub risk_level: String,
}

impl EventRecord {
    pub fn is_critical(&self) -> bool {
        self.risk_level == CRITICAL_RISK
    }

    pub fn is_high_impact(&self) -> bool {
        self.market_impact == HIGH_IMPACT
    }
}

/// Events detected in one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    #[serde(flatten)]
    pub filing: DocumentMetadata,

    pub events: Vec<EventRecord>,

    pub event_count: usize,

    pub detection_timestamp: DateTime<Utc>,

    pub has_critical_events: bool,

    pub has_high_impact_events: bool,
}

impl EventResult {
    /// Build a result, deriving the count and both flags from `events`.
    pub fn new(filing: DocumentMetadata, events: Vec<EventRecord>) -> Self {
        Self {
            has_critical_events: events.iter().any(EventRecord::is_critical),
            has_high_impact_events: events.iter().any(EventRecord::is_high_impact),
            event_count: events.len(),
            detection_timestamp: Utc::now(),
            filing,
            events,
        }
    }

    pub fn filing_id(&self) -> &str {
        self.filing.filing_id()
    }
}
