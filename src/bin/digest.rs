use tg_digest::core::{AppConfig, RunOutcome};
use tg_digest::pipeline;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tg_digest::setup_logging();

    let config = AppConfig::from_env()?;
    match pipeline::run(&config).await? {
        RunOutcome::Empty => info!("No channel posts yesterday; nothing sent to Slack"),
        RunOutcome::Delivered {
            messages,
            fallbacks,
            posts,
        } => info!(messages, fallbacks, posts, "Digest delivered"),
    }

    Ok(())
}
