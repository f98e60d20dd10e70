//! Feishu bot webhook delivery.
//!
//! One POST per run, never retried. Without a webhook the card is
//! printed to stdout so the run can be checked locally.

use crate::models::NotificationPayload;
use anyhow::{anyhow, Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Timeout for the webhook POST.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Success value of the Feishu `code` field.
const FEISHU_SUCCESS: i64 = 0;

/// What happened to the rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Accepted by the webhook.
    Delivered,
    /// No webhook configured; printed to the console instead.
    Skipped,
    /// Webhook call failed or was rejected.
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

#[derive(Debug, Deserialize)]
struct WebhookReply {
    // Legacy bot endpoints answer with StatusCode/StatusMessage.
    #[serde(alias = "StatusCode")]
    code: Option<i64>,
    #[serde(alias = "StatusMessage")]
    msg: Option<String>,
}

pub struct FeishuNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl FeishuNotifier {
    /// Create a notifier. `None` selects console output.
    pub fn new(webhook_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("Failed to create webhook HTTP client")?;

        Ok(Self {
            webhook_url,
            client,
        })
    }

    /// Deliver the payload once.
    pub async fn deliver(&self, payload: &NotificationPayload) -> DeliveryOutcome {
        let Some(url) = self.webhook_url.as_deref() else {
            print_to_console(payload);
            return DeliveryOutcome::Skipped;
        };

        println!("📤 Sending Feishu card...");
        match self.post(url, payload).await {
            Ok(()) => {
                info!("Feishu card delivered");
                println!("✅ Feishu card delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("Feishu delivery failed: {:#}", e);
                println!("❌ Feishu delivery failed: {:#}", e);
                DeliveryOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    async fn post(&self, url: &str, payload: &NotificationPayload) -> Result<()> {
        debug!("POST card to Feishu webhook");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("Webhook timed out after {}s", WEBHOOK_TIMEOUT.as_secs())
                } else if e.is_connect() {
                    anyhow!("Cannot connect to webhook host")
                } else {
                    anyhow!("Failed to send webhook request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Webhook HTTP error {}: {}", status, body));
        }

        let reply: WebhookReply = response
            .json()
            .await
            .context("Failed to parse webhook response")?;

        match reply.code {
            Some(FEISHU_SUCCESS) => Ok(()),
            code => Err(anyhow!(
                "Feishu rejected the card (code {}): {}",
                code.map(|c| c.to_string()).unwrap_or_else(|| "missing".to_string()),
                reply.msg.unwrap_or_default()
            )),
        }
    }
}

fn print_to_console(payload: &NotificationPayload) {
    warn!("No Feishu webhook configured; printing card instead of sending");

    println!("\n{}", "=".repeat(50));
    println!("⚠️  No Feishu webhook configured");
    println!("Local mode: printing the card, nothing is sent");
    println!("{}\n", "=".repeat(50));

    match serde_json::to_string_pretty(payload) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize card: {}", e),
    }
}
