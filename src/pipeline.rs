//! The daily run: fetch one day of channel history, summarize each post,
//! deliver the digest to Slack.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::ai::{GeminiClient, Summarizer};
use crate::core::config::AppConfig;
use crate::core::models::{DigestEntry, EntrySummary, RunOutcome, excerpt};
use crate::core::window::FetchWindow;
use crate::errors::DigestError;
use crate::slack::{Notifier, SlackWebhook, render_digest};
use crate::telegram::{ChannelClient, MessageSource};

/// Run the digest for the previous calendar day with the real Telegram,
/// Gemini, and Slack clients.
pub async fn run(config: &AppConfig) -> Result<RunOutcome, DigestError> {
    let window = FetchWindow::previous_day(config.timezone, Utc::now());
    let source = ChannelClient::connect(config).await?;
    let mut summarizer = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_rpm,
    );
    let webhook = SlackWebhook::new(config.slack_webhook_url.clone());

    run_with(
        &config.channel.to_string(),
        &window,
        &source,
        &mut summarizer,
        &webhook,
    )
    .await
}

/// Driver over the three component seams.
///
/// Fatal errors abort the run. A single message's summarization failure
/// does not: the entry keeps an excerpt of the source text and the run
/// continues. A window without messages ends the run before any Gemini
/// or Slack traffic.
pub async fn run_with<S, A, N>(
    channel: &str,
    window: &FetchWindow,
    source: &S,
    summarizer: &mut A,
    notifier: &N,
) -> Result<RunOutcome, DigestError>
where
    S: MessageSource,
    A: Summarizer,
    N: Notifier,
{
    let messages = source.fetch(window).await?;
    if messages.is_empty() {
        info!("No messages on {}; nothing to deliver", window.day());
        return Ok(RunOutcome::Empty);
    }

    info!("Summarizing {} messages", messages.len());
    let mut entries: Vec<DigestEntry> = Vec::with_capacity(messages.len());
    let mut fallbacks = 0usize;

    for message in messages {
        debug!(id = message.id, "Summarizing message");
        let summary = match summarizer.summarize(&message.text).await {
            Ok(summary) => EntrySummary::Generated(summary),
            Err(e) => {
                warn!(id = message.id, error = %e, "Summarization failed, keeping an excerpt");
                fallbacks += 1;
                EntrySummary::Excerpt(excerpt(&message.text))
            }
        };
        entries.push(DigestEntry { message, summary });
    }

    let payloads = render_digest(channel, window, &entries);
    info!("Delivering {} payload(s) to Slack", payloads.len());
    for payload in &payloads {
        notifier.post(payload).await?;
    }

    Ok(RunOutcome::Delivered {
        messages: entries.len(),
        fallbacks,
        posts: payloads.len(),
    })
}
