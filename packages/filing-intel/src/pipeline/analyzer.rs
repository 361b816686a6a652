//! Filing analysis orchestration.
//!
//! One analysis is a strict three-phase sequence:
//! 1. whole-document summary
//! 2. one concurrent call per non-empty section
//! 3. overall assessment over the summary
//!
//! Each call's outcome becomes a value before the join, so a failing
//! section never takes the others (or the filing) down with it.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::invoke::invoke;
use crate::pipeline::prompts::{
    render_within, truncate_chars, truncate_with_marker, ASSESSMENT_PROMPT, NO_SUMMARY, SECTION_PROMPT,
    SUMMARY_PROMPT,
};
use crate::pipeline::sections::SectionExtractor;
use crate::traits::gateway::{ModelGateway, ModelReply, TaskClass};
use crate::types::{
    analysis::{FilingAnalysis, SectionAnalysis},
    config::PipelineConfig,
    metadata::{DocumentMetadata, IssuerInfo},
};

/// Drives the summary → sections → assessment sequence for one filing.
pub struct FilingAnalyzer<G: ModelGateway> {
    gateway: G,
    config: Arc<PipelineConfig>,
    sections: SectionExtractor,
}

impl<G: ModelGateway> FilingAnalyzer<G> {
    /// Create an analyzer. Fails only if a section label cannot be compiled.
    pub fn new(gateway: G, config: Arc<PipelineConfig>) -> Result<Self> {
        let sections = SectionExtractor::new(&config)?;
        Ok(Self {
            gateway,
            config,
            sections,
        })
    }

    pub fn section_extractor(&self) -> &SectionExtractor {
        &self.sections
    }

    /// Analyze one filing.
    ///
    /// Errors only on invalid metadata; model failures are reported through
    /// the success flags of the returned analysis.
    pub async fn analyze(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        issuer_info: Option<&IssuerInfo>,
    ) -> Result<FilingAnalysis> {
        metadata.validate()?;
        let limits = &self.config.limits;
        let filing_date = metadata.filing_date().to_string();

        let summary_prompt = render_within(
            SUMMARY_PROMPT,
            &[
                ("filing_type", metadata.filing_type()),
                ("filing_date", filing_date.as_str()),
                ("text", truncate_chars(text, limits.summary_chars)),
            ],
            limits.prompt_chars,
        );
        let summary = self.call(&summary_prompt, TaskClass::Summarization).await;

        let sections = self.sections.extract(text, metadata.filing_type());
        let section_calls = sections
            .iter()
            .filter(|(_, body)| !body.trim().is_empty())
            .map(|(label, body)| async move {
                let body = truncate_with_marker(body, limits.section_chars);
                let prompt = render_within(
                    SECTION_PROMPT,
                    &[
                        ("section", label.as_str()),
                        ("filing_type", metadata.filing_type()),
                        ("text", &*body),
                    ],
                    limits.prompt_chars,
                );
                match self.call(&prompt, TaskClass::Analysis).await {
                    ModelReply::Completed(analysis) => SectionAnalysis::succeeded(label, analysis),
                    ModelReply::Failed(error) => SectionAnalysis::failed(label, error),
                }
            });
        let section_analyses: Vec<SectionAnalysis> = join_all(section_calls).await;

        let summary_text = if summary.is_success() {
            summary.text()
        } else {
            NO_SUMMARY
        };
        let assessment_prompt = render_within(
            ASSESSMENT_PROMPT,
            &[
                ("filing_type", metadata.filing_type()),
                ("company_name", metadata.company_name()),
                ("filing_date", filing_date.as_str()),
                ("summary", summary_text),
            ],
            limits.prompt_chars,
        );
        let assessment = self.call(&assessment_prompt, TaskClass::Analysis).await;

        let analysis_success = summary.is_success() && assessment.is_success();
        let failed_sections = section_analyses.iter().filter(|s| !s.success).count();
        if failed_sections > 0 {
            warn!(
                filing_id = metadata.filing_id(),
                failed_sections, "Some section analyses failed"
            );
        }
        info!(
            filing_id = metadata.filing_id(),
            sections = section_analyses.len(),
            analysis_success,
            "Filing analysis complete"
        );

        Ok(FilingAnalysis {
            filing: metadata.clone(),
            issuer_info: issuer_info.cloned(),
            summary: summary.into_text(),
            section_analyses,
            overall_assessment: assessment.into_text(),
            analysis_timestamp: Utc::now(),
            analysis_success,
        })
    }

    async fn call(&self, prompt: &str, task: TaskClass) -> ModelReply {
        invoke(&self.gateway, prompt, task, self.config.limits.prompt_chars).await
    }
}
