//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use legalwatch_api::AppState;
use legalwatch_core::{Pipeline, ProgressReporter, ReportSink, RunSummary, ingest_feed};
use legalwatch_feed::FeedOptions;
use legalwatch_ner::DeepPavlovEngine;
use legalwatch_report::Synthesizer;
use legalwatch_shared::{AppConfig, LegalWatchError, init_config, load_config, load_config_from};
use legalwatch_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LegalWatch: monitor legislative changes and summarize them.
#[derive(Parser)]
#[command(
    name = "legalwatch",
    version,
    about = "Collect legal-news items, extract entities, and generate analytical reports.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.legalwatch/legalwatch.toml).
    #[arg(long, env = "LEGALWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the RSS feed and store new items.
    Fetch {
        /// Feed URL (overrides config).
        #[arg(long)]
        feed_url: Option<String>,
    },

    /// Analyze stored items and write the report.
    Analyze,

    /// Fetch first if no database exists yet, then analyze.
    Run,

    /// Start the HTTP API.
    Serve {
        /// Address to bind (overrides config).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "legalwatch=info",
        1 => "legalwatch=debug",
        _ => "legalwatch=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Fetch { feed_url } => {
            cmd_fetch(&resolve_config(config_path)?, feed_url.as_deref()).await
        }
        Command::Analyze => cmd_analyze(&resolve_config(config_path)?).await,
        Command::Run => cmd_run(&resolve_config(config_path)?).await,
        Command::Serve { bind } => cmd_serve(resolve_config(config_path)?, bind).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_fetch(config: &AppConfig, feed_url: Option<&str>) -> Result<()> {
    let db_path = PathBuf::from(&config.defaults.db_path);
    let storage = Storage::open(&db_path).await?;
    fetch_into(config, &storage, feed_url).await
}

async fn fetch_into(config: &AppConfig, storage: &Storage, feed_url: Option<&str>) -> Result<()> {
    let feed_url = feed_url.unwrap_or(&config.defaults.feed_url);
    let opts = FeedOptions {
        timeout_secs: config.defaults.request_timeout_secs,
    };

    info!(feed_url, db = %storage.path().display(), "fetching feed");

    let reporter = CliProgress::new();
    let result = ingest_feed(storage, feed_url, &opts, &reporter).await;
    reporter.spinner.finish_and_clear();
    let summary = result?;

    println!();
    println!("  Feed ingested.");
    println!("  Items in feed: {}", summary.fetched);
    println!("  New items:     {}", summary.inserted);
    println!("  Database:      {}", storage.path().display());
    println!();
    Ok(())
}

async fn cmd_analyze(config: &AppConfig) -> Result<()> {
    let storage = Storage::open_existing(Path::new(&config.defaults.db_path))
        .await
        .wrap_err("run `legalwatch fetch` first to create the database")?;
    analyze_with(config, storage).await
}

async fn cmd_run(config: &AppConfig) -> Result<()> {
    let db_path = PathBuf::from(&config.defaults.db_path);
    let storage = Storage::open(&db_path).await?;

    if needs_ingest(&storage).await? {
        info!(db = %db_path.display(), "database is empty, fetching feed first");
        fetch_into(config, &storage, None).await?;
    }

    analyze_with(config, storage).await
}

/// An empty store gets the feed first, including one left behind by a
/// fetch that failed.
async fn needs_ingest(storage: &Storage) -> Result<bool> {
    Ok(storage.count_items().await? == 0)
}

async fn analyze_with(config: &AppConfig, storage: Storage) -> Result<()> {
    let engine = DeepPavlovEngine::new(&config.ner)?;
    let synthesizer = Synthesizer::from_config(config)?;

    info!(
        providers = ?synthesizer.chain().provider_names(),
        ner = %config.ner.url,
        "starting analysis"
    );

    let pipeline = Pipeline::new(
        storage,
        Arc::new(engine),
        Arc::new(synthesizer),
        ReportSink::new(&config.defaults.report_path),
    );

    let reporter = CliProgress::new();
    let result = pipeline.run(&reporter).await;
    reporter.spinner.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(LegalWatchError::NothingToReport) => {
            println!("Nothing to report: the database has no analyzable items.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    println!("  Report generated.");
    println!("  Analyzed: {}", summary.analyzed);
    println!("  Skipped:  {}", summary.skipped);
    println!("  Provider: {}", summary.report.provider);
    println!("  Path:     {}", summary.report_path.display());
    println!();
    Ok(())
}

async fn cmd_serve(mut config: AppConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config)?;
    legalwatch_api::serve(&config.server, Arc::new(state)).await?;
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_analyzed(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Analyzing [{current}/{total}] {title}"));
    }

    fn item_skipped(&self, title: &str, error: &LegalWatchError) {
        self.spinner
            .println(format!("  skipped: {title} ({error})"));
    }

    fn item_stored(&self, title: &str, inserted: bool) {
        if inserted {
            self.spinner.println(format!("  added: {title}"));
        }
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
