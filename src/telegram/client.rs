use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::types::Chat;
use grammers_client::{Client, Config, InvocationError};
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::models::{ChannelMessage, ChannelRef};
use crate::core::window::FetchWindow;
use crate::errors::DigestError;
use crate::telegram::session;

/// RPC errors that mean the stored session is no longer usable.
const AUTH_RPC_ERRORS: &[&str] = &[
    "AUTH_KEY_UNREGISTERED",
    "SESSION_REVOKED",
    "SESSION_EXPIRED",
    "USER_DEACTIVATED",
];

/// RPC errors that mean the channel cannot be read from this account.
const NOT_FOUND_RPC_ERRORS: &[&str] = &[
    "USERNAME_NOT_OCCUPIED",
    "USERNAME_INVALID",
    "CHANNEL_PRIVATE",
    "CHANNEL_INVALID",
    "PEER_ID_INVALID",
];

/// Source of one day's channel messages. The pipeline depends on this
/// seam so tests can run against a fixed message list.
#[async_trait]
pub trait MessageSource {
    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<ChannelMessage>, DigestError>;
}

/// MTProto-backed [`MessageSource`] for the configured channel.
pub struct ChannelClient {
    client: Client,
    channel: ChannelRef,
}

impl ChannelClient {
    /// Connect and verify the session is authorized. Fails before any
    /// history access when the session is missing, invalid, or revoked.
    pub async fn connect(config: &AppConfig) -> Result<Self, DigestError> {
        let session = session::load(config)?;

        let client = Client::connect(Config {
            session,
            api_id: config.api.api_id,
            api_hash: config.api.api_hash.clone(),
            params: Default::default(),
        })
        .await
        .map_err(|e| DigestError::Telegram(format!("failed to connect: {e}")))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| classify_rpc_error("checking authorization", &e))?;
        if !authorized {
            return Err(DigestError::Auth(
                "session is not authorized; run the login tool and refresh TELEGRAM_SESSION"
                    .to_string(),
            ));
        }

        info!("Connected to Telegram");
        Ok(Self {
            client,
            channel: config.channel.clone(),
        })
    }

    /// Resolve the configured channel reference to a concrete chat.
    async fn resolve(&self) -> Result<Chat, DigestError> {
        match &self.channel {
            ChannelRef::Name(name) => {
                let resolved = self
                    .client
                    .resolve_username(name)
                    .await
                    .map_err(|e| classify_rpc_error("resolving channel", &e))?;
                resolved.ok_or_else(|| DigestError::ChannelNotFound(format!("@{name}")))
            }
            ChannelRef::Id(id) => {
                let mut dialogs = self.client.iter_dialogs();
                while let Some(dialog) = dialogs
                    .next()
                    .await
                    .map_err(|e| classify_rpc_error("listing dialogs", &e))?
                {
                    if dialog.chat().id() == *id {
                        return Ok(dialog.chat().clone());
                    }
                }
                Err(DigestError::ChannelNotFound(format!(
                    "id {id} is not among this account's dialogs"
                )))
            }
        }
    }
}

#[async_trait]
impl MessageSource for ChannelClient {
    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<ChannelMessage>, DigestError> {
        let chat = self.resolve().await?;
        info!(channel = %self.channel, day = %window.day(), "Fetching channel history");

        let mut collected: Vec<ChannelMessage> = Vec::new();
        let mut scanned = 0usize;
        let mut history = self.client.iter_messages(&chat);

        // History arrives newest first
        while let Some(message) = history
            .next()
            .await
            .map_err(|e| classify_rpc_error("fetching history", &e))?
        {
            scanned += 1;
            let timestamp = message.date();
            match scan_action(timestamp, message.text(), window) {
                ScanAction::TooNew => continue,
                ScanAction::TooOld => break,
                ScanAction::NoText => {
                    debug!(id = message.id(), "Skipping post without text");
                    continue;
                }
                ScanAction::Keep => collected.push(ChannelMessage {
                    id: message.id(),
                    timestamp,
                    text: message.text().trim().to_string(),
                    link: message_link(&chat, message.id()),
                }),
            }
        }

        // Oldest first for the digest
        collected.reverse();
        info!(
            "Collected {} messages for {} (scanned {})",
            collected.len(),
            window.day(),
            scanned
        );
        Ok(collected)
    }
}

/// Decision for one message while scanning newest-first history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanAction {
    /// At or past the window end; older posts may still match.
    TooNew,
    /// Before the window start; every remaining post is older still.
    TooOld,
    /// Inside the window but with nothing to summarize.
    NoText,
    Keep,
}

fn scan_action(timestamp: DateTime<Utc>, text: &str, window: &FetchWindow) -> ScanAction {
    if timestamp >= window.end_utc() {
        return ScanAction::TooNew;
    }
    if timestamp < window.start_utc() {
        return ScanAction::TooOld;
    }
    if text.trim().is_empty() {
        return ScanAction::NoText;
    }
    ScanAction::Keep
}

fn classify_rpc_error(context: &str, error: &InvocationError) -> DigestError {
    if AUTH_RPC_ERRORS.iter().any(|name| error.is(name)) {
        return DigestError::Auth(format!("{context}: {error}"));
    }
    if NOT_FOUND_RPC_ERRORS.iter().any(|name| error.is(name)) {
        return DigestError::ChannelNotFound(format!("{context}: {error}"));
    }
    DigestError::Telegram(format!("{context}: {error}"))
}

/// Permalink to a channel post. Public channels get the username form,
/// private channels and megagroups the `t.me/c` form.
fn message_link(chat: &Chat, message_id: i32) -> Option<String> {
    if let Some(username) = chat.username() {
        return Some(format!("https://t.me/{username}/{message_id}"));
    }
    match chat {
        Chat::Channel(_) | Chat::Group(_) => {
            Some(format!("https://t.me/c/{}/{message_id}", chat.id()))
        }
        Chat::User(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use chrono_tz::Asia::Seoul;

    fn window() -> FetchWindow {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        FetchWindow::for_day(Seoul, day)
    }

    #[test]
    fn scan_keeps_posts_inside_the_window() {
        let window = window();
        assert_eq!(
            scan_action(window.start_utc(), "뉴스 본문", &window),
            ScanAction::Keep
        );
        assert_eq!(
            scan_action(window.end_utc() - Duration::seconds(1), "뉴스 본문", &window),
            ScanAction::Keep
        );
    }

    #[test]
    fn scan_skips_posts_at_or_past_the_window_end() {
        let window = window();
        assert_eq!(
            scan_action(window.end_utc(), "뉴스 본문", &window),
            ScanAction::TooNew
        );
        assert_eq!(
            scan_action(window.end_utc() + Duration::hours(2), "뉴스 본문", &window),
            ScanAction::TooNew
        );
    }

    #[test]
    fn scan_stops_at_the_first_post_before_the_window() {
        let window = window();
        assert_eq!(
            scan_action(window.start_utc() - Duration::seconds(1), "뉴스 본문", &window),
            ScanAction::TooOld
        );
    }

    #[test]
    fn scan_skips_textless_posts_inside_the_window() {
        let window = window();
        let inside = window.start_utc() + Duration::hours(3);
        assert_eq!(scan_action(inside, "", &window), ScanAction::NoText);
        assert_eq!(scan_action(inside, "   ", &window), ScanAction::NoText);
    }
}
