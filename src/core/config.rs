use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use url::Url;

use crate::core::models::ChannelRef;
use crate::errors::DigestError;

const DEFAULT_SESSION_FILE: &str = "tg-digest.session";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_RPM: u32 = 15;
const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

/// Telegram application credentials plus the session file location.
/// This subset is all the interactive login needs.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_id: i32,
    pub api_hash: String,
    pub session_file: PathBuf,
}

impl ApiCredentials {
    pub fn from_env() -> Result<Self, DigestError> {
        Ok(Self {
            api_id: required("TELEGRAM_API_ID")?
                .parse::<i32>()
                .map_err(|e| DigestError::Config(format!("TELEGRAM_API_ID: {e}")))?,
            api_hash: required("TELEGRAM_API_HASH")?,
            session_file: optional("TELEGRAM_SESSION_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from),
        })
    }
}

/// Runtime configuration for the daily run, fully resolved from the
/// environment before any network call. Components receive this instead
/// of reading env vars themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiCredentials,
    /// Base64 session blob; wins over the session file when set.
    pub session_base64: Option<String>,
    pub channel: ChannelRef,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_rpm: u32,
    pub slack_webhook_url: Url,
    pub timezone: Tz,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DigestError> {
        let channel_raw = required("TELEGRAM_CHANNEL")?;
        let channel = ChannelRef::parse(&channel_raw).ok_or_else(|| {
            DigestError::Config(format!("TELEGRAM_CHANNEL: no channel in {channel_raw:?}"))
        })?;

        let gemini_rpm = match optional("GEMINI_RPM") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| DigestError::Config(format!("GEMINI_RPM: {e}")))?,
            None => DEFAULT_GEMINI_RPM,
        };
        if gemini_rpm == 0 {
            return Err(DigestError::Config(
                "GEMINI_RPM: must be at least 1".to_string(),
            ));
        }

        let webhook_raw = required("SLACK_WEBHOOK_URL")?;
        let slack_webhook_url = Url::parse(&webhook_raw)
            .map_err(|e| DigestError::Config(format!("SLACK_WEBHOOK_URL: {e}")))?;

        let timezone = optional("DIGEST_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
            .parse::<Tz>()
            .map_err(|e| DigestError::Config(format!("DIGEST_TIMEZONE: {e}")))?;

        Ok(Self {
            api: ApiCredentials::from_env()?,
            session_base64: optional("TELEGRAM_SESSION"),
            channel,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_rpm,
            slack_webhook_url,
            timezone,
        })
    }
}

fn required(name: &str) -> Result<String, DigestError> {
    match optional(name) {
        Some(value) => Ok(value),
        None => Err(DigestError::Config(format!("{name} is not set"))),
    }
}

/// Unset and set-but-blank are treated the same.
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
