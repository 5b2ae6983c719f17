//! All Slack-specific functionality

pub mod blocks;
pub mod webhook;

// Re-export main types for convenience
pub use blocks::{WebhookMessage, render_digest};
pub use webhook::{Notifier, SlackWebhook};
