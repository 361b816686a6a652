//! Result persistence trait.
//!
//! The pipeline hands results to a store and reads historical entity
//! extractions back for linking. Layout is the implementation's business;
//! the contract is:
//! - every result is kept as the filing's "latest" plus a timestamped
//!   history entry
//! - event results with critical events are also indexed separately

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{
    analysis::FilingAnalysis,
    entity::{ExtractionResult, LinkResult},
    event::EventResult,
};

/// Storage for pipeline results, keyed by filing id.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn store_analysis(&self, analysis: &FilingAnalysis) -> Result<()>;

    /// Also indexes the result as critical when it has critical events.
    async fn store_events(&self, events: &EventResult) -> Result<()>;

    async fn store_entities(&self, entities: &ExtractionResult) -> Result<()>;

    async fn store_links(&self, links: &LinkResult) -> Result<()>;

    async fn latest_analysis(&self, filing_id: &str) -> Result<Option<FilingAnalysis>>;

    async fn latest_events(&self, filing_id: &str) -> Result<Option<EventResult>>;

    async fn latest_entities(&self, filing_id: &str) -> Result<Option<ExtractionResult>>;

    async fn latest_links(&self, filing_id: &str) -> Result<Option<LinkResult>>;

    /// Latest extractions of other filings by the same issuer, newest first.
    async fn recent_extractions(
        &self,
        cik: &str,
        exclude_filing_id: &str,
        limit: usize,
    ) -> Result<Vec<ExtractionResult>>;

    /// Critical event results for filings dated on or after `since`, most
    /// recent filing first.
    async fn critical_events(&self, since: NaiveDate, limit: usize) -> Result<Vec<EventResult>>;
}
