//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Trendbot - hourly trending topics digest for Feishu
///
/// Fetches the Zhihu hot list, Weibo hot search and V2EX hot topics,
/// renders them into one interactive card and posts it to a Feishu
/// bot webhook. Without a webhook the card is printed to the console.
///
/// Examples:
///   trendbot
///   FEISHU_WEBHOOK=https://open.feishu.cn/open-apis/bot/v2/hook/xxx trendbot
///   trendbot --dry-run --output card.json
///   trendbot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Feishu bot webhook URL
    ///
    /// When absent the rendered card is printed instead of sent.
    #[arg(long, value_name = "URL", env = "FEISHU_WEBHOOK", hide_env_values = true)]
    pub webhook: Option<String>,

    /// Tianapi key for the keyed Weibo provider
    ///
    /// Without it only the free fallback provider is used.
    #[arg(long, value_name = "KEY", env = "TIANAPI_KEY", hide_env_values = true)]
    pub tianapi_key: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .trendbot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the rendered card as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fetch and render, but print the card instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 when the card was not delivered
    #[arg(long)]
    pub fail_on_undelivered: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .trendbot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(webhook) = self.webhook.as_deref().map(str::trim) {
            if !webhook.is_empty()
                && !webhook.starts_with("http://")
                && !webhook.starts_with("https://")
            {
                return Err("Webhook URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
