/// tg-digest - A daily digest bot that mirrors a Telegram channel into Slack.
///
/// Once a day an external scheduler runs the `digest` binary, which:
/// 1. Fetches yesterday's posts from the configured Telegram channel over MTProto
/// 2. Summarizes each post into three Korean lines with Google Gemini
/// 3. Posts the aggregated digest to a Slack incoming webhook
///
/// The companion `login` binary runs once per deployment: it signs in
/// interactively (phone, code, optional 2FA password) and prints the
/// base64 session blob that deployed runs read from `TELEGRAM_SESSION`.
///
/// # Architecture
///
/// The system uses:
/// - grammers for the MTProto user session and channel history
/// - The Gemini `generateContent` REST API for the three-line summaries
/// - A Slack incoming webhook for delivery
/// - Tokio for the async runtime
///
/// # Example
///
/// ```no_run
/// use tg_digest::core::config::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     // Set up structured logging
///     tg_digest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let outcome = tg_digest::pipeline::run(&config).await?;
///     println!("{outcome:?}");
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod core;
pub mod errors;
pub mod pipeline;
pub mod slack;
pub mod telegram;

/// Configure structured logging for console output.
///
/// Sets up tracing-subscriber with a compact fmt layer and an `EnvFilter`
/// honoring `RUST_LOG`, defaulting to `info`. Call once at the start of
/// each binary.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your binary
/// tg_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
