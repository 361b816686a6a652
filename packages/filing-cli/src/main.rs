//! Filing analysis CLI
//!
//! `filing-intel analyze` runs the pipeline on one filing and prints the
//! report as JSON. `filing-intel sections` shows how a filing splits into
//! sections without calling any model.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use filing_intel::{
    AnalysisMode, DocumentMetadata, FilingProcessor, IssuerInfoProvider, MemoryStore,
    NoIssuerInfo, OpenRouterGateway, SecSubmissionsProvider, SectionExtractor,
};
use openrouter_client::OpenRouterClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{load_pipeline_config, Config};

#[derive(Parser, Debug)]
#[command(name = "filing-intel", version, about = "Structured intelligence from SEC filings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analysis pipeline on a filing and print the report
    Analyze(AnalyzeArgs),

    /// Print the sections extracted from a filing (no model calls)
    Sections {
        /// Path to the filing text
        file: PathBuf,

        /// Form type, e.g. 8-K
        #[arg(long)]
        form_type: String,

        /// JSON file overriding pipeline defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Path to the filing text
    file: PathBuf,

    /// Accession number
    #[arg(long)]
    filing_id: String,

    /// Form type, e.g. 8-K
    #[arg(long)]
    form_type: String,

    /// Issuer name
    #[arg(long)]
    company: Option<String>,

    /// Issuer CIK
    #[arg(long)]
    cik: Option<String>,

    /// Filing date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// full, summary, events or entities
    #[arg(long, default_value = "full")]
    mode: AnalysisMode,

    /// JSON file overriding pipeline defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not query the SEC for issuer details
    #[arg(long)]
    skip_issuer_lookup: bool,
}

impl AnalyzeArgs {
    fn metadata(&self) -> DocumentMetadata {
        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let meta = DocumentMetadata::new(&self.filing_id, &self.form_type, date);
        match (&self.company, &self.cik) {
            (None, None) => meta,
            (company, cik) => meta.with_issuer(
                company.as_deref().unwrap_or(filing_intel::types::metadata::UNKNOWN),
                cik.as_deref().unwrap_or(filing_intel::types::metadata::UNKNOWN),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout stays machine-readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,filing_intel=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Analyze(args) => analyze(&config, args).await,
        Command::Sections {
            file,
            form_type,
            config: config_path,
        } => sections(&file, &form_type, config_path.as_deref()).await,
    }
}

async fn read_filing(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read filing {}", path.display()))
}

async fn analyze(config: &Config, args: AnalyzeArgs) -> Result<()> {
    let text = read_filing(&args.file).await?;
    let pipeline = load_pipeline_config(args.config.as_deref())?;
    let metadata = args.metadata();

    let mut client = OpenRouterClient::new(config.require_api_key()?)
        .with_app_title(&config.app_title)
        .with_referer(&config.referer);
    if let Some(base_url) = &config.openrouter_base_url {
        client = client.with_base_url(base_url);
    }
    let gateway = OpenRouterGateway::new(client);

    tracing::info!(
        filing_id = metadata.filing_id(),
        form_type = metadata.filing_type(),
        mode = %args.mode,
        "Analyzing filing"
    );

    if args.skip_issuer_lookup {
        run(gateway, NoIssuerInfo, pipeline, &text, &metadata, args.mode).await
    } else {
        let issuers = SecSubmissionsProvider::new(&config.sec_user_agent)
            .context("Invalid SEC user agent")?;
        run(gateway, issuers, pipeline, &text, &metadata, args.mode).await
    }
}

async fn run<P: IssuerInfoProvider>(
    gateway: OpenRouterGateway,
    issuers: P,
    pipeline: filing_intel::PipelineConfig,
    text: &str,
    metadata: &DocumentMetadata,
    mode: AnalysisMode,
) -> Result<()> {
    let processor = FilingProcessor::new(gateway, issuers, MemoryStore::new(), pipeline)
        .context("Failed to build pipeline")?;
    let report = processor
        .process(text, metadata, mode)
        .await
        .context("Filing processing failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn sections(file: &Path, form_type: &str, config_path: Option<&Path>) -> Result<()> {
    let text = read_filing(file).await?;
    let pipeline = load_pipeline_config(config_path)?;
    let extractor = SectionExtractor::new(&pipeline).context("Invalid section catalog")?;

    let sections = extractor.extract(&text, form_type);
    println!("{}", serde_json::to_string_pretty(&sections)?);
    Ok(())
}
