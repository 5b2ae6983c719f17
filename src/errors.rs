use thiserror::Error;

/// Fatal pipeline errors. Any of these ends the run with a non-zero exit.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Notification error: {0}")]
    Notify(String),
}

/// Per-message summarization errors. The pipeline logs these and keeps
/// going with an excerpt of the source text in place of the summary.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Failed to send request to Gemini: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error: {0}")]
    Api(String),

    #[error("Gemini returned no summary text")]
    Empty,

    #[error("Malformed summary: {0}")]
    Malformed(String),
}
