use async_trait::async_trait;
use reqwest::Client;
use tracing::error;
use url::Url;

use crate::errors::DigestError;
use crate::slack::blocks::WebhookMessage;

/// Delivery seam for rendered payloads.
#[async_trait]
pub trait Notifier {
    async fn post(&self, message: &WebhookMessage) -> Result<(), DigestError>;
}

/// Slack incoming-webhook client. One POST per payload, no retries.
pub struct SlackWebhook {
    client: Client,
    url: Url,
}

impl SlackWebhook {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn post(&self, message: &WebhookMessage) -> Result<(), DigestError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            // without_url keeps the webhook secret out of the diagnostic
            .map_err(|e| DigestError::Notify(format!("webhook request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "Slack webhook rejected the payload");
            return Err(DigestError::Notify(format!(
                "webhook returned {status}: {body}"
            )));
        }
        Ok(())
    }
}
