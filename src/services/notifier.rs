//! Run status notifications
//!
//! Best-effort messages at run boundaries. Delivery failures are logged and
//! swallowed; a notifier can never fail the pipeline.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{PipelineConfig, RunMode};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Outbound status message capability
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a status message. Must not fail the caller.
    async fn notify(&self, text: &str);
}

/// Default notifier when no webhook is configured or the run is interactive
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _text: &str) {}
}

/// Discord-compatible webhook notifier
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Webhook client build failed: {e}")))?;

        Ok(Self {
            http_client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) {
        let body = serde_json::json!({ "content": text });

        match self
            .http_client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    status = response.status().as_u16(),
                    "Notification webhook rejected message"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Notification webhook unreachable");
            }
        }
    }
}

/// Webhook messages fire only for scheduled runs with a webhook configured
fn webhook_enabled(config: &PipelineConfig) -> bool {
    config.webhook_url.is_some() && config.run_mode == RunMode::Scheduled
}

/// Select the notifier for this run
pub fn from_config(config: &PipelineConfig) -> Result<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) if webhook_enabled(config) => Ok(Arc::new(WebhookNotifier::new(url)?)),
        _ => Ok(Arc::new(NoopNotifier)),
    }
}
