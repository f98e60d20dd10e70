//! Source fetchers for the trending platforms.
//!
//! Each platform module exposes one `fetch` function that performs its
//! request(s) and maps the response into a ranked [`PlatformResult`].
//! [`SourceFetcher`] owns the shared HTTP client and turns every error
//! into the single-item sentinel result, so nothing escapes to callers.

pub mod v2ex;
pub mod weibo;
pub mod zhihu;

use crate::config::SourcesConfig;
use crate::models::{Platform, PlatformResult, FAILED_TITLE};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request timeout for the Zhihu hot list.
pub const ZHIHU_TIMEOUT: Duration = Duration::from_secs(15);

/// Request timeout for every other source request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait before the single V2EX retry.
pub const V2EX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Sentinel title used when both Weibo providers fail.
pub const WEIBO_FAILED_TITLE: &str = "微博获取失败，请检查API配置";

/// Reasons a single platform fetch can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The site answered 403, most likely an anti-scraping block.
    #[error("blocked by the site (HTTP 403)")]
    Blocked,

    /// Unexpected HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// Transport, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyed provider answered with a non-success code.
    #[error("provider returned code {code}: {msg}")]
    Provider { code: i64, msg: String },

    /// Provider answered but flagged the response as unsuccessful.
    #[error("provider reported failure")]
    Unsuccessful,

    /// The response decoded but held no entries.
    #[error("response contained no entries")]
    Empty,

    /// Every candidate provider failed.
    #[error("all providers failed")]
    Exhausted,
}

impl FetchError {
    /// Title of the sentinel item that replaces the failed list.
    pub fn sentinel_title(&self) -> &'static str {
        match self {
            FetchError::Exhausted => WEIBO_FAILED_TITLE,
            _ => FAILED_TITLE,
        }
    }
}

/// Result of one fetch attempt. `success` is informational only.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub result: PlatformResult,
    pub success: bool,
}

/// Builds the shared client with browser-like default headers.
pub fn build_client(config: &SourcesConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).context("Invalid user_agent header value")?,
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
    headers.insert(
        REFERER,
        HeaderValue::from_str(&config.referer).context("Invalid referer header value")?,
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to create HTTP client")
}

/// Fetches one platform at a time through a shared client.
pub struct SourceFetcher {
    client: Client,
    config: SourcesConfig,
    retry_delay: Duration,
}

impl SourceFetcher {
    /// Create a fetcher for the given source settings.
    pub fn new(config: SourcesConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config,
            retry_delay: V2EX_RETRY_DELAY,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch one platform. Never fails: errors become the sentinel result.
    pub async fn fetch(&self, platform: Platform) -> FetchOutcome {
        debug!("Fetching {}", platform);

        let attempt = match platform {
            Platform::Zhihu => zhihu::fetch(&self.client, &self.config).await,
            Platform::Weibo => weibo::fetch(&self.client, &self.config).await,
            Platform::V2ex => v2ex::fetch(&self.client, &self.config, self.retry_delay).await,
        }
        .and_then(non_empty);

        match attempt {
            Ok(result) => {
                info!("{}: fetched {} items", platform, result.len());
                FetchOutcome {
                    result,
                    success: true,
                }
            }
            Err(e) => {
                if matches!(e, FetchError::Blocked) {
                    warn!(
                        "{} returned 403, request blocked; retry later or from another IP",
                        platform
                    );
                } else {
                    warn!("{} fetch failed: {}", platform, e);
                }
                FetchOutcome {
                    result: PlatformResult::failed(platform, e.sentinel_title()),
                    success: false,
                }
            }
        }
    }
}

/// Rejects a decoded list with no entries so the sentinel replaces it.
pub(crate) fn non_empty(result: PlatformResult) -> Result<PlatformResult, FetchError> {
    if result.is_empty() {
        Err(FetchError::Empty)
    } else {
        Ok(result)
    }
}

/// Renders a loosely typed popularity field as text.
pub(crate) fn value_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
