//! `pactum`: audit contracts from the command line.
//!
//! ## Commands
//!
//! - `audit`: run one document through the pipeline
//! - `samples`: audit a directory of sample contracts
//! - `list` / `show` / `text`: inspect stored records
//! - `review`: record a human decision on a flagged contract
//! - `duration`: normalize a single duration phrase

mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pactum_ai::fallback;
use pactum_ai::{
    DurationNormalizer, ExtractionConfig, Extractor, GeminiClient, GeminiConfig, InferenceClient,
};
use pactum_audit::{AuditError, Auditor, SampleOutcome};
use pactum_core::{ContractFacts, ContractStatus, HumanReview, RecordId, RuleConfig};
use pactum_rules::RuleEvaluator;
use pactum_store::{ContractStore, DirectoryCorpus, FileStore, RecordFilter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pactum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Contract audit pipeline: LLM extraction plus business-rule review", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding contract records
    #[arg(long, global = true, env = "PACTUM_DATA_DIR", default_value = ".pactum")]
    data_dir: PathBuf,

    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    rules: RuleArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = pactum_ai::gemini::DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, global = true, env = "GEMINI_BASE_URL", default_value = pactum_ai::gemini::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-call model timeout in seconds
    #[arg(long, global = true, env = "PACTUM_TIMEOUT_SECS", default_value = "60")]
    timeout_secs: u64,
}

#[derive(clap::Args)]
struct RuleArgs {
    /// Display name of the accepted jurisdiction
    #[arg(long, global = true, env = "PACTUM_JURISDICTION")]
    jurisdiction: Option<String>,

    /// Comma-separated tokens identifying the accepted jurisdiction
    #[arg(long, global = true, env = "PACTUM_ALLOW", value_delimiter = ',')]
    allow: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a plain-text contract
    Audit {
        /// Path to the contract file
        file: PathBuf,
    },

    /// Audit sample contracts from a directory of .txt files
    Samples {
        #[arg(long)]
        dir: PathBuf,

        /// Number of samples to audit (at most 10)
        #[arg(short, long, default_value = "5")]
        n: usize,
    },

    /// List stored contracts, newest first
    List {
        /// Only show contracts in this status
        #[arg(long)]
        status: Option<String>,

        /// Only show contracts waiting for human review
        #[arg(long)]
        review: bool,
    },

    /// Show a stored contract
    Show { id: String },

    /// Print the raw text of a stored contract
    Text { id: String },

    /// Record a human review decision
    Review {
        id: String,

        /// Approve the contract
        #[arg(long)]
        approve: bool,

        /// Reviewer notes
        #[arg(long)]
        notes: Option<String>,

        /// JSON file with corrected facts (defaults to the extracted ones)
        #[arg(long)]
        facts: Option<PathBuf>,
    },

    /// Normalize a duration phrase to whole months
    Duration {
        text: String,

        /// Use only the deterministic pattern grammar
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!("pactum v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Audit { ref file } => cmd_audit(&cli, file).await,
        Commands::Samples { ref dir, n } => cmd_samples(&cli, dir, n).await,
        Commands::List { ref status, review } => cmd_list(&cli, status.as_deref(), review).await,
        Commands::Show { ref id } => cmd_show(&cli, id).await,
        Commands::Text { ref id } => cmd_text(&cli, id).await,
        Commands::Review {
            ref id,
            approve,
            ref notes,
            ref facts,
        } => cmd_review(&cli, id, approve, notes.clone(), facts.as_deref()).await,
        Commands::Duration { ref text, offline } => cmd_duration(&cli, text, offline).await,
    }
}

// ── Wiring ──

impl ModelArgs {
    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn client(&self) -> Result<Arc<dyn InferenceClient>> {
        let Some(api_key) = self.api_key.clone() else {
            bail!("GEMINI_API_KEY is not set (pass --api-key or export it)");
        };
        let config = GeminiConfig {
            base_url: self.base_url.clone(),
            api_key,
            model: self.model.clone(),
            timeout: self.call_timeout(),
        };
        Ok(Arc::new(GeminiClient::new(config).context("building Gemini client")?))
    }
}

impl RuleArgs {
    fn config(&self) -> RuleConfig {
        let config = RuleConfig::default();
        match (&self.jurisdiction, self.allow.is_empty()) {
            (None, true) => config,
            (label, _) => {
                let label = label.clone().unwrap_or(config.jurisdiction_label.clone());
                let tokens = if self.allow.is_empty() {
                    vec![label.clone()]
                } else {
                    self.allow.clone()
                };
                config.with_jurisdiction(&label, tokens)
            }
        }
    }
}

async fn open_store(cli: &Cli) -> Result<Arc<FileStore>> {
    let store = FileStore::open(&cli.data_dir)
        .await
        .with_context(|| format!("opening store at {}", cli.data_dir.display()))?;
    Ok(Arc::new(store))
}

async fn build_auditor(cli: &Cli) -> Result<Auditor> {
    let client = cli.model.client()?;
    let extraction = ExtractionConfig {
        call_timeout: cli.model.call_timeout(),
        ..Default::default()
    };
    let normalizer = DurationNormalizer::new(client.clone()).with_timeout(cli.model.call_timeout());
    let store = open_store(cli).await?;
    Ok(Auditor::new(
        Extractor::new(client, extraction),
        RuleEvaluator::new(normalizer, cli.rules.config()),
        store,
    ))
}

// ── Commands ──

async fn cmd_audit(cli: &Cli, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let auditor = build_auditor(cli).await?;
    match auditor.audit_document(&file_name, &bytes).await {
        Ok(report) => {
            let record = auditor.store().get(&report.id).await?;
            display::print_record_card(&record);
            Ok(())
        }
        Err(AuditError::Rejected { id, message }) => {
            if let Ok(record) = auditor.store().get(&id).await {
                display::print_record_card(&record);
            }
            bail!("contract {id} rejected: {message}")
        }
        Err(e) => Err(e.into()),
    }
}

async fn cmd_samples(cli: &Cli, dir: &Path, n: usize) -> Result<()> {
    let auditor = build_auditor(cli).await?;
    let corpus = DirectoryCorpus::new(dir);
    let outcomes = auditor.audit_samples(&corpus, n).await?;

    let mut failed = 0usize;
    for outcome in &outcomes {
        match outcome {
            SampleOutcome::Audited(report) => println!(
                "{:<36}  {:<22}  issues={}  {}ms",
                report.id.to_string(),
                report.status.as_str(),
                report.issues.len(),
                report.processing_time_ms
            ),
            SampleOutcome::Failed { title, id, error } => {
                failed += 1;
                let id = id.as_ref().map(|i| i.to_string()).unwrap_or_else(|| "-".into());
                println!("{id:<36}  {:<22}  {title}: {error}", "failed");
            }
        }
    }
    eprintln!("  Audited {} samples ({failed} failed)", outcomes.len());
    Ok(())
}

async fn cmd_list(cli: &Cli, status: Option<&str>, review: bool) -> Result<()> {
    let status = match status {
        Some(s) => Some(ContractStatus::parse(s).with_context(|| {
            let known: Vec<&str> = ContractStatus::ALL.iter().map(|s| s.as_str()).collect();
            format!("unknown status '{s}' (expected one of: {})", known.join(", "))
        })?),
        None => None,
    };
    let filter = RecordFilter {
        status,
        requires_review: review.then_some(true),
    };
    let records = open_store(cli).await?.list(&filter).await?;
    display::print_record_table(&records);
    Ok(())
}

async fn cmd_show(cli: &Cli, id: &str) -> Result<()> {
    let record = open_store(cli).await?.get(&RecordId::from(id)).await?;
    display::print_record_card(&record);
    Ok(())
}

async fn cmd_text(cli: &Cli, id: &str) -> Result<()> {
    let record = open_store(cli).await?.get(&RecordId::from(id)).await?;
    match record.raw_text {
        Some(text) => println!("{text}"),
        None => bail!("contract {id} has no extracted text"),
    }
    Ok(())
}

async fn cmd_review(
    cli: &Cli,
    id: &str,
    approve: bool,
    notes: Option<String>,
    facts_path: Option<&Path>,
) -> Result<()> {
    let store = open_store(cli).await?;
    let id = RecordId::from(id);
    let facts: ContractFacts = match facts_path {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&bytes).context("parsing corrected facts")?
        }
        None => store.get(&id).await?.facts.unwrap_or_default(),
    };
    let review = HumanReview {
        facts,
        human_approved: approve,
        reviewer_notes: notes,
    };
    let record = store.apply_review(&id, review).await?;
    display::print_record_card(&record);
    Ok(())
}

async fn cmd_duration(cli: &Cli, text: &str, offline: bool) -> Result<()> {
    let parsed = if offline {
        fallback::parse_duration(text)
    } else {
        let client = cli.model.client()?;
        DurationNormalizer::new(client)
            .with_timeout(cli.model.call_timeout())
            .normalize(text)
            .await
    };
    let limit = cli.rules.config().max_duration_months;
    println!("  {:<26} {}", "months", parsed.months.map_or("-".to_string(), |m| m.to_string()));
    println!("  {:<26} {}", "has_extra_days", parsed.has_extra_days);
    println!("  {:<26} {}", "reasoning", parsed.reasoning);
    println!("  {:<26} {}", format!("exceeds_{limit}_months"), parsed.exceeds(limit));
    Ok(())
}
