//! Filing Analysis Pipeline
//!
//! Turns long, semi-structured regulatory filings into structured
//! intelligence: per-section analyses, a categorized event list with
//! risk and impact scores, and entities linked across filings.
//!
//! Every structured result comes from a generative model's free-text
//! reply. The library decides what to send, runs the calls (concurrently
//! where it can, without letting one failure sink the rest), and recovers
//! records from the replies with well-defined defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use filing_intel::{AnalysisMode, FilingProcessor, MemoryStore, PipelineConfig};
//! use filing_intel::testing::MockGateway;
//! use filing_intel::traits::issuer::NoIssuerInfo;
//!
//! let processor = FilingProcessor::new(
//!     MockGateway::new(),
//!     NoIssuerInfo,
//!     MemoryStore::new(),
//!     PipelineConfig::default(),
//! )?;
//!
//! let report = processor.process(&text, &metadata, AnalysisMode::Full).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (ModelGateway, IssuerInfoProvider, ResultStore)
//! - [`types`] - Metadata, results and configuration
//! - [`pipeline`] - Sections, orchestration, parsing, detection, linking
//! - [`stores`] - Storage implementations (MemoryStore)
//! - [`issuers`] - Issuer info providers (SEC submissions)
//! - [`gateway`] - Model gateway implementations (OpenRouter, behind `openrouter`)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod gateway;
pub mod issuers;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FilingError, Result};
pub use traits::{
    gateway::{ModelGateway, ModelReply, TaskClass},
    issuer::{IssuerInfoProvider, NoIssuerInfo},
    store::ResultStore,
};
pub use types::{
    analysis::{FilingAnalysis, SectionAnalysis, SectionMap},
    config::{ModelTable, PipelineConfig, TruncationLimits, COMPLETE_DOCUMENT, OTHER_MATERIAL_EVENT},
    entity::{EntityRecord, ExtractionResult, LinkRecord, LinkResult, Significance},
    event::{EventRecord, EventResult},
    metadata::{DocumentMetadata, IssuerInfo},
};

// Re-export pipeline components
pub use pipeline::{
    AnalysisMode, EntityLinker, EventDetector, EventTaxonomy, FilingAnalyzer, FilingProcessor,
    ProcessingReport, SectionExtractor,
};

// Re-export stores and providers
pub use issuers::SecSubmissionsProvider;
pub use stores::MemoryStore;

#[cfg(feature = "openrouter")]
pub use gateway::OpenRouterGateway;
