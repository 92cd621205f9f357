//! Decision Audit Console - Main Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};

use audit_console::api::{Console, OutputFormat};
use audit_console::config::ConsoleConfig;
use audit_console::constants;
use audit_console::logic::ingest::IngestForm;
use audit_console::logic::model::RiskLevel;
use audit_console::logic::search::SearchForm;

#[derive(Parser)]
#[command(name = "audit-console")]
#[command(about = "Inspect and feed the decision audit log")]
#[command(version)]
#[command(
    after_help = "Environment:\n  AUDIT_API_URL              Audit store origin\n  AUDIT_API_TIMEOUT_SECS     Request timeout\n  DASHBOARD_REFRESH_SECS     Dashboard refresh interval\n  DASHBOARD_HIGH_RISK_LIMIT  Rows in the high-risk list"
)]
struct Cli {
    /// Audit store origin, overrides AUDIT_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print view state as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store health
    Health,
    /// Live statistics and recent high-risk decisions
    Dashboard {
        /// Exit after the first refresh
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Search historical decisions
    Search {
        #[arg(long)]
        source_system: Option<String>,
        #[arg(long)]
        risk_level: Option<RiskLevel>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Show one decision's full trace
    Trace {
        decision_id: String,
        /// Also ask the store to verify the record hash
        #[arg(long, default_value_t = false)]
        verify: bool,
    },
    /// Submit a new decision record
    Ingest {
        #[arg(long)]
        source_system: String,
        #[arg(long, default_value = "medium")]
        risk_level: RiskLevel,
        #[arg(long, default_value = "0.95")]
        confidence: String,
        /// Input payload as JSON
        #[arg(long, default_value = "{}")]
        input: String,
        /// Output as JSON
        #[arg(long, default_value = "{}")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Missing .env is the normal case
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("{} v{}", constants::APP_NAME, constants::APP_VERSION);

    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url)?;
    }
    let output = if cli.json { OutputFormat::Json } else { OutputFormat::Text };
    let console = Console::connect(config, output)?;

    match cli.command {
        Commands::Health => console.health().await,
        Commands::Dashboard { once } => console.dashboard(once).await,
        Commands::Search {
            source_system,
            risk_level,
            text,
        } => {
            console
                .search(SearchForm {
                    source_system: source_system.unwrap_or_default(),
                    risk_level,
                    search_text: text.unwrap_or_default(),
                })
                .await
        }
        Commands::Trace { decision_id, verify } => console.trace(&decision_id, verify).await,
        Commands::Ingest {
            source_system,
            risk_level,
            confidence,
            input,
            output,
        } => {
            console
                .ingest(IngestForm {
                    source_system,
                    risk_level,
                    confidence,
                    input_payload: input,
                    output,
                })
                .await
        }
    }
}
