//! End-to-end processing of one filing: analysis, events, entities and
//! links, persisted through a [`ResultStore`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FilingError, Result};
use crate::pipeline::{analyzer::FilingAnalyzer, entities::EntityLinker, events::EventDetector};
use crate::traits::{gateway::ModelGateway, issuer::IssuerInfoProvider, store::ResultStore};
use crate::types::{
    analysis::FilingAnalysis,
    config::PipelineConfig,
    entity::{ExtractionResult, LinkResult},
    event::EventResult,
    metadata::{DocumentMetadata, IssuerInfo},
};

/// Which parts of the pipeline to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Analysis, events (with the analysis as context), entities and links.
    #[default]
    Full,
    /// Analysis only.
    Summary,
    /// Events only.
    Events,
    /// Entities and links only.
    Entities,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Summary => "summary",
            Self::Events => "events",
            Self::Entities => "entities",
        }
    }

    fn runs_analysis(self) -> bool {
        matches!(self, Self::Full | Self::Summary)
    }

    fn runs_events(self) -> bool {
        matches!(self, Self::Full | Self::Events)
    }

    fn runs_entities(self) -> bool {
        matches!(self, Self::Full | Self::Entities)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = FilingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "summary" => Ok(Self::Summary),
            "events" => Ok(Self::Events),
            "entities" => Ok(Self::Entities),
            other => Err(FilingError::Config(format!(
                "unknown analysis mode '{}' (expected full, summary, events or entities)",
                other
            ))),
        }
    }
}

/// Everything one `process` call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub filing_id: String,
    pub mode: AnalysisMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FilingAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<EventResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<ExtractionResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkResult>,
}

/// Runs the pipeline for one filing and stores what it produces.
pub struct FilingProcessor<G, P, S>
where
    G: ModelGateway,
    P: IssuerInfoProvider,
    S: ResultStore,
{
    analyzer: FilingAnalyzer<Arc<G>>,
    detector: EventDetector<Arc<G>>,
    linker: EntityLinker<Arc<G>>,
    issuers: P,
    store: S,
    config: Arc<PipelineConfig>,
}

impl<G, P, S> FilingProcessor<G, P, S>
where
    G: ModelGateway,
    P: IssuerInfoProvider,
    S: ResultStore,
{
    /// Build every component against one shared gateway and config.
    pub fn new(gateway: G, issuers: P, store: S, config: PipelineConfig) -> Result<Self> {
        let gateway = Arc::new(gateway);
        let config = Arc::new(config);
        Ok(Self {
            analyzer: FilingAnalyzer::new(gateway.clone(), config.clone())?,
            detector: EventDetector::new(gateway.clone(), config.clone())?,
            linker: EntityLinker::new(gateway, config.clone())?,
            issuers,
            store,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn analyzer(&self) -> &FilingAnalyzer<Arc<G>> {
        &self.analyzer
    }

    /// Process one filing.
    ///
    /// Fails on invalid metadata or a storage error. Issuer lookup failures
    /// are logged and ignored.
    pub async fn process(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        mode: AnalysisMode,
    ) -> Result<ProcessingReport> {
        metadata.validate()?;
        let filing_id = metadata.filing_id();
        info!(filing_id, %mode, "Starting filing processing");

        let issuer_info = self.issuer_info(metadata).await;
        let mut report = ProcessingReport {
            filing_id: filing_id.to_string(),
            mode,
            analysis: None,
            events: None,
            entities: None,
            links: None,
        };

        if mode.runs_analysis() {
            let analysis = self
                .analyzer
                .analyze(text, metadata, issuer_info.as_ref())
                .await?;
            self.store.store_analysis(&analysis).await?;
            report.analysis = Some(analysis);
        }

        if mode.runs_events() {
            let events = self
                .detector
                .detect(text, metadata, report.analysis.as_ref())
                .await?;
            self.store.store_events(&events).await?;
            if events.has_critical_events {
                warn!(filing_id, events = events.event_count, "Critical events detected");
            }
            report.events = Some(events);
        }

        if mode.runs_entities() {
            let entities = self.linker.extract(text, metadata).await?;
            self.store.store_entities(&entities).await?;

            let history = if metadata.has_cik() {
                self.store
                    .recent_extractions(metadata.cik(), filing_id, self.config.history_window)
                    .await?
            } else {
                Vec::new()
            };
            let links = self.linker.link(&entities, &history).await?;
            self.store.store_links(&links).await?;

            report.entities = Some(entities);
            report.links = Some(links);
        }

        info!(filing_id, %mode, "Completed filing processing");
        Ok(report)
    }

    async fn issuer_info(&self, metadata: &DocumentMetadata) -> Option<IssuerInfo> {
        if !metadata.has_cik() {
            return None;
        }
        match self.issuers.lookup(metadata.cik()).await {
            Ok(info) => info,
            Err(e) => {
                warn!(cik = metadata.cik(), error = %e, "Issuer lookup failed, continuing without it");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{MockGateway, MockIssuerProvider};
    use crate::traits::issuer::NoIssuerInfo;
    use chrono::NaiveDate;

    fn meta(id: &str) -> DocumentMetadata {
        DocumentMetadata::new(id, "8-K", NaiveDate::from_ymd_opt(2023, 3, 1).unwrap())
            .with_issuer("APPLE INC", "0000320193")
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("FULL".parse::<AnalysisMode>().unwrap(), AnalysisMode::Full);
        assert_eq!("events".parse::<AnalysisMode>().unwrap(), AnalysisMode::Events);
        assert!("everything".parse::<AnalysisMode>().is_err());
        assert_eq!(AnalysisMode::Entities.to_string(), "entities");
    }

    #[tokio::test]
    async fn test_summary_mode_runs_analysis_only() {
        let gateway = MockGateway::new();
        let processor = FilingProcessor::new(
            gateway.clone(),
            NoIssuerInfo,
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = processor
            .process("body", &meta("a"), AnalysisMode::Summary)
            .await
            .unwrap();

        assert!(report.analysis.is_some());
        assert!(report.events.is_none() && report.entities.is_none() && report.links.is_none());
        assert!(processor.store().latest_analysis("a").await.unwrap().is_some());
        assert!(processor.store().latest_events("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_mode_passes_analysis_to_detector() {
        let gateway = MockGateway::new().with_reply("Summarize the following", "distinct summary");
        let processor = FilingProcessor::new(
            gateway.clone(),
            NoIssuerInfo,
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = processor
            .process("body", &meta("a"), AnalysisMode::Full)
            .await
            .unwrap();

        assert!(report.analysis.is_some());
        assert!(report.events.is_some());
        assert!(report.entities.is_some());
        assert!(report.links.is_some());
        let event_prompts: Vec<_> = gateway
            .calls()
            .into_iter()
            .filter(|c| c.prompt.contains("identify significant events"))
            .collect();
        assert_eq!(event_prompts.len(), 1);
        assert!(event_prompts[0].prompt.contains("Filing Summary:\ndistinct summary"));
    }

    #[tokio::test]
    async fn test_entities_mode_links_against_same_issuer_history() {
        let gateway = MockGateway::new().with_reply("named entities", "1. Name: Katherine Adams");
        let processor = FilingProcessor::new(
            gateway.clone(),
            NoIssuerInfo,
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();

        let first = processor
            .process("body", &meta("first"), AnalysisMode::Entities)
            .await
            .unwrap();
        assert_eq!(gateway.calls_containing("Historical filing information"), 0);
        assert!(first.links.unwrap().links.is_empty());

        processor
            .process("body", &meta("second"), AnalysisMode::Entities)
            .await
            .unwrap();
        assert_eq!(gateway.calls_containing("Historical filing information"), 1);
        assert_eq!(gateway.calls_containing("Filing ID: first,"), 1);
        assert!(processor.store().latest_links("second").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_issuer_lookup_failure_is_ignored() {
        let issuers = MockIssuerProvider::new().failing();
        let processor = FilingProcessor::new(
            MockGateway::new(),
            issuers.clone(),
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = processor
            .process("body", &meta("a"), AnalysisMode::Summary)
            .await
            .unwrap();

        assert_eq!(issuers.lookups(), vec!["0000320193"]);
        assert!(report.analysis.unwrap().issuer_info.is_none());
    }

    #[tokio::test]
    async fn test_issuer_info_attached_when_known() {
        let info = IssuerInfo {
            name: Some("Apple Inc.".to_string()),
            tickers: vec!["AAPL".to_string()],
            ..Default::default()
        };
        let issuers = MockIssuerProvider::new().with_issuer("0000320193", info.clone());
        let processor = FilingProcessor::new(
            MockGateway::new(),
            issuers,
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = processor
            .process("body", &meta("a"), AnalysisMode::Summary)
            .await
            .unwrap();
        assert_eq!(report.analysis.unwrap().issuer_info, Some(info));
    }

    #[tokio::test]
    async fn test_invalid_metadata_stops_processing() {
        let gateway = MockGateway::new();
        let processor = FilingProcessor::new(
            gateway.clone(),
            NoIssuerInfo,
            MemoryStore::new(),
            PipelineConfig::default(),
        )
        .unwrap();
        let meta = DocumentMetadata::new("id", " ", NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());

        let err = processor.process("body", &meta, AnalysisMode::Full).await;
        assert!(matches!(err, Err(FilingError::InvalidMetadata { .. })));
        assert!(gateway.calls().is_empty());
    }
}
