//! In-memory result storage for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::store::ResultStore;
use crate::types::{
    analysis::FilingAnalysis,
    entity::{ExtractionResult, LinkResult},
    event::EventResult,
};

/// Latest value for a filing plus every version ever stored.
#[derive(Debug, Clone)]
struct Versioned<T> {
    latest: T,
    history: Vec<(DateTime<Utc>, T)>,
}

type Table<T> = RwLock<HashMap<String, Versioned<T>>>;

fn put<T: Clone>(table: &Table<T>, filing_id: &str, value: &T) {
    let stored_at = Utc::now();
    let mut table = table.write().unwrap();
    match table.get_mut(filing_id) {
        Some(entry) => {
            entry.latest = value.clone();
            entry.history.push((stored_at, value.clone()));
        }
        None => {
            table.insert(
                filing_id.to_string(),
                Versioned {
                    latest: value.clone(),
                    history: vec![(stored_at, value.clone())],
                },
            );
        }
    }
}

fn latest<T: Clone>(table: &Table<T>, filing_id: &str) -> Option<T> {
    table
        .read()
        .unwrap()
        .get(filing_id)
        .map(|entry| entry.latest.clone())
}

/// In-memory storage for analyses, events, entities and links.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    analyses: Table<FilingAnalysis>,
    events: Table<EventResult>,
    entities: Table<ExtractionResult>,
    links: Table<LinkResult>,
    critical: RwLock<Vec<EventResult>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            analyses: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            entities: RwLock::new(HashMap::new()),
            links: RwLock::new(HashMap::new()),
            critical: RwLock::new(Vec::new()),
        }
    }

    /// Every analysis stored for a filing, oldest first.
    pub fn analysis_history(&self, filing_id: &str) -> Vec<(DateTime<Utc>, FilingAnalysis)> {
        self.analyses
            .read()
            .unwrap()
            .get(filing_id)
            .map(|entry| entry.history.clone())
            .unwrap_or_default()
    }

    /// Number of filings with stored entity extractions.
    pub fn extraction_count(&self) -> usize {
        self.entities.read().unwrap().len()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.analyses.write().unwrap().clear();
        self.events.write().unwrap().clear();
        self.entities.write().unwrap().clear();
        self.links.write().unwrap().clear();
        self.critical.write().unwrap().clear();
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn store_analysis(&self, analysis: &FilingAnalysis) -> Result<()> {
        put(&self.analyses, analysis.filing_id(), analysis);
        Ok(())
    }

    async fn store_events(&self, events: &EventResult) -> Result<()> {
        put(&self.events, events.filing_id(), events);
        if events.has_critical_events {
            self.critical.write().unwrap().push(events.clone());
        }
        Ok(())
    }

    async fn store_entities(&self, entities: &ExtractionResult) -> Result<()> {
        put(&self.entities, entities.filing_id(), entities);
        Ok(())
    }

    async fn store_links(&self, links: &LinkResult) -> Result<()> {
        put(&self.links, &links.filing_id, links);
        Ok(())
    }

    async fn latest_analysis(&self, filing_id: &str) -> Result<Option<FilingAnalysis>> {
        Ok(latest(&self.analyses, filing_id))
    }

    async fn latest_events(&self, filing_id: &str) -> Result<Option<EventResult>> {
        Ok(latest(&self.events, filing_id))
    }

    async fn latest_entities(&self, filing_id: &str) -> Result<Option<ExtractionResult>> {
        Ok(latest(&self.entities, filing_id))
    }

    async fn latest_links(&self, filing_id: &str) -> Result<Option<LinkResult>> {
        Ok(latest(&self.links, filing_id))
    }

    async fn recent_extractions(
        &self,
        cik: &str,
        exclude_filing_id: &str,
        limit: usize,
    ) -> Result<Vec<ExtractionResult>> {
        let mut matches: Vec<ExtractionResult> = self
            .entities
            .read()
            .unwrap()
            .values()
            .map(|entry| &entry.latest)
            .filter(|e| e.filing.cik() == cik && e.filing_id() != exclude_filing_id)
            .cloned()
            .collect();

        // Newest filing first; re-extractions of the same date by time
        matches.sort_by(|a, b| {
            b.filing
                .filing_date()
                .cmp(&a.filing.filing_date())
                .then(b.extraction_timestamp.cmp(&a.extraction_timestamp))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn critical_events(&self, since: NaiveDate, limit: usize) -> Result<Vec<EventResult>> {
        let mut matches: Vec<EventResult> = self
            .critical
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.filing.filing_date() >= since)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.filing
                .filing_date()
                .cmp(&a.filing.filing_date())
                .then(b.detection_timestamp.cmp(&a.detection_timestamp))
        });
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{entity::EntityRecord, event::EventRecord, metadata::DocumentMetadata};
    use chrono::NaiveDate;

    fn meta(id: &str, cik: &str, day: u32) -> DocumentMetadata {
        DocumentMetadata::new(id, "8-K", NaiveDate::from_ymd_opt(2023, 3, day).unwrap())
            .with_issuer("ISSUER", cik)
    }

    fn extraction(id: &str, cik: &str, day: u32) -> ExtractionResult {
        ExtractionResult {
            filing: meta(id, cik, day),
            extracted_text: String::new(),
            raw_entities: vec![EntityRecord {
                name: "Katherine Adams".to_string(),
                entity_type: "person".to_string(),
                role: "mentioned".to_string(),
                context: String::new(),
            }],
            extraction_timestamp: Utc::now(),
        }
    }

    fn event(risk: &str) -> EventRecord {
        EventRecord {
            description: "Management Change at the company".to_string(),
            category: "Management Change".to_string(),
            entities_involved: Vec::new(),
            financial_impact: "Unknown".to_string(),
            market_impact: "Unknown".to_string(),
            risk_level: risk.to_string(),
        }
    }

    #[tokio::test]
    async fn test_latest_and_history() {
        let store = MemoryStore::new();
        let mut analysis = FilingAnalysis {
            filing: meta("a", "1", 1),
            issuer_info: None,
            summary: "first".to_string(),
            section_analyses: Vec::new(),
            overall_assessment: String::new(),
            analysis_timestamp: Utc::now(),
            analysis_success: true,
        };
        store.store_analysis(&analysis).await.unwrap();
        analysis.summary = "second".to_string();
        store.store_analysis(&analysis).await.unwrap();

        let latest = store.latest_analysis("a").await.unwrap().unwrap();
        assert_eq!(latest.summary, "second");
        let history = store.analysis_history("a");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].1.summary, "first");
        assert!(store.latest_analysis("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recent_extractions_filters_and_orders() {
        let store = MemoryStore::new();
        store.store_entities(&extraction("old", "1", 1)).await.unwrap();
        store.store_entities(&extraction("new", "1", 5)).await.unwrap();
        store.store_entities(&extraction("mid", "1", 3)).await.unwrap();
        store.store_entities(&extraction("other-issuer", "2", 4)).await.unwrap();
        store.store_entities(&extraction("current", "1", 6)).await.unwrap();

        let recent = store.recent_extractions("1", "current", 2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.filing_id()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
        assert_eq!(store.extraction_count(), 5);
    }

    #[tokio::test]
    async fn test_only_critical_results_are_indexed() {
        let store = MemoryStore::new();
        let calm = EventResult::new(meta("calm", "1", 1), vec![event("Medium")]);
        let critical = EventResult::new(meta("hot", "1", 2), vec![event("Critical")]);
        store.store_events(&calm).await.unwrap();
        store.store_events(&critical).await.unwrap();

        let since = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let found = store.critical_events(since, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filing_id(), "hot");

        let after = NaiveDate::from_ymd_opt(2023, 3, 3).unwrap();
        assert!(store.critical_events(after, 10).await.unwrap().is_empty());
        assert!(store.latest_events("calm").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_critical_events_follow_filing_date() {
        let store = MemoryStore::new();
        store
            .store_events(&EventResult::new(meta("newer-filing", "1", 20), vec![event("Critical")]))
            .await
            .unwrap();
        store
            .store_events(&EventResult::new(meta("older-filing", "1", 5), vec![event("Critical")]))
            .await
            .unwrap();
        store
            .store_events(&EventResult::new(meta("mid-filing", "1", 10), vec![event("Critical")]))
            .await
            .unwrap();

        let since = NaiveDate::from_ymd_opt(2023, 3, 10).unwrap();
        let found = store.critical_events(since, 10).await.unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.filing_id()).collect();
        assert_eq!(ids, vec!["newer-filing", "mid-filing"]);

        let first = store.critical_events(since, 1).await.unwrap();
        assert_eq!(first[0].filing_id(), "newer-filing");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        store.store_entities(&extraction("a", "1", 1)).await.unwrap();
        store.clear();
        assert_eq!(store.extraction_count(), 0);
    }
}
