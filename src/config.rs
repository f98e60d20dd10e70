//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.trendbot.toml` files. Secrets (webhook URL, API key) usually come
//! from the environment through the CLI layer instead.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".trendbot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source endpoint settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Notification settings.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Endpoints and client identity used by the fetchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Zhihu hot list endpoint.
    #[serde(default = "default_zhihu_url")]
    pub zhihu_url: String,

    /// Value of the `limit` query parameter sent to Zhihu.
    #[serde(default = "default_zhihu_limit")]
    pub zhihu_limit: usize,

    /// Keyed Weibo provider endpoint.
    #[serde(default = "default_tianapi_url")]
    pub tianapi_url: String,

    /// API key for the keyed Weibo provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tianapi_key: Option<String>,

    /// Unauthenticated Weibo provider endpoint.
    #[serde(default = "default_vvhan_url")]
    pub vvhan_url: String,

    /// V2EX hot topics endpoint.
    #[serde(default = "default_v2ex_url")]
    pub v2ex_url: String,

    /// Browser-like User-Agent sent with every fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer sent with every fetch.
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            zhihu_url: default_zhihu_url(),
            zhihu_limit: default_zhihu_limit(),
            tianapi_url: default_tianapi_url(),
            tianapi_key: None,
            vvhan_url: default_vvhan_url(),
            v2ex_url: default_v2ex_url(),
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

fn default_zhihu_url() -> String {
    "https://www.zhihu.com/api/v3/feed/topstory/hot-lists/total".to_string()
}

fn default_zhihu_limit() -> usize {
    20
}

fn default_tianapi_url() -> String {
    "https://apis.tianapi.com/networkhot/index".to_string()
}

fn default_vvhan_url() -> String {
    "https://api.vvhan.com/api/hotlist/wbHot".to_string()
}

fn default_v2ex_url() -> String {
    "https://www.v2ex.com/api/topics/hot.json".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_referer() -> String {
    "https://www.zhihu.com/".to_string()
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Feishu bot webhook. Without it the card is printed instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Footer note shown under the card body.
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            footer: default_footer(),
        }
    }
}

fn default_footer() -> String {
    "💡 由 GitHub Actions 自动推送 | 如有问题请检查Actions日志".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.trendbot.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (including their environment fallbacks) take
    /// precedence; empty values are treated as unset.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(webhook) = non_empty(args.webhook.as_deref()) {
            self.notify.webhook_url = Some(webhook);
        }

        if let Some(key) = non_empty(args.tianapi_key.as_deref()) {
            self.sources.tianapi_key = Some(key);
        }

        // A blank entry in the file means "not configured".
        self.notify.webhook_url = non_empty(self.notify.webhook_url.as_deref());
        self.sources.tianapi_key = non_empty(self.sources.tianapi_key.as_deref());
    }

    /// Check settings that only fail at use time otherwise.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.notify.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("Webhook URL must start with 'http://' or 'https://': {}", url);
            }
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
