//! Trendbot - hourly trending topics digest
//!
//! A CLI that fetches the Zhihu hot list, Weibo hot search and V2EX
//! hot topics, renders them into one Feishu interactive card and
//! posts it to a bot webhook. Meant to be started by an external
//! scheduler (cron, CI schedule) once per hour.
//!
//! Exit codes:
//!   0 - Run completed (including undelivered cards, unless --fail-on-undelivered)
//!   1 - Runtime error (config, HTTP client setup, output file)
//!   2 - Card not delivered and --fail-on-undelivered was set

mod aggregate;
mod cli;
mod config;
mod models;
mod notify;
mod render;
mod sources;

use aggregate::{AggregatedResults, Aggregator};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::NotificationPayload;
use notify::{DeliveryOutcome, FeishuNotifier};
use sources::SourceFetcher;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Local runs keep FEISHU_WEBHOOK / TIANAPI_KEY in .env; absent in CI.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Trendbot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .trendbot.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set the webhook via FEISHU_WEBHOOK or [notify].webhook_url.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG`, when set, overrides the -v/-q level.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Everything one run produced.
struct RunReport {
    results: AggregatedResults,
    payload: NotificationPayload,
    outcome: DeliveryOutcome,
}

/// Run the complete workflow. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    println!("\n{}", "=".repeat(50));
    println!("🤖 Trendbot started - {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}\n", "=".repeat(50));

    if config.sources.tianapi_key.is_none() {
        info!("No Tianapi key configured; Weibo uses the free provider only");
    }

    let webhook = if args.dry_run {
        info!("Dry run: the card will be printed, not sent");
        None
    } else {
        config.notify.webhook_url.clone()
    };

    let fetcher = SourceFetcher::new(config.sources.clone())?;
    let aggregator = Aggregator::new(fetcher);
    let notifier = FeishuNotifier::new(webhook)?;

    let report = run_pipeline(&aggregator, &notifier, &config.notify.footer).await;

    if let Some(ref path) = args.output {
        write_card(path, &report.payload)?;
        println!("💾 Card saved to: {}", path.display());
    }

    let fetched = report.results.len();
    println!(
        "\n🏁 Done - {} ({} platforms, delivery: {:?})\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        fetched,
        report.outcome
    );

    if args.fail_on_undelivered && !report.outcome.is_delivered() {
        eprintln!("⛔ Card was not delivered. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Fetch, render and deliver once.
async fn run_pipeline(
    aggregator: &Aggregator,
    notifier: &FeishuNotifier,
    footer: &str,
) -> RunReport {
    let results = aggregator.fetch_all().await;
    print_summary(&results);

    let payload = render::build_card(&results, now_local(), footer);
    debug!("Rendered card: {}", payload.title());

    let outcome = notifier.deliver(&payload).await;

    RunReport {
        results,
        payload,
        outcome,
    }
}

/// Save the rendered card as pretty JSON.
fn write_card(path: &Path, payload: &NotificationPayload) -> Result<()> {
    let json = serde_json::to_string_pretty(payload).context("Failed to serialize card")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write card to {}", path.display()))
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

fn print_summary(results: &AggregatedResults) {
    println!("\n{}", "=".repeat(50));
    println!("📊 Fetch summary:");
    for line in results.summary_lines() {
        println!("{}", line);
    }
    println!("{}\n", "=".repeat(50));
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
