//! Configuration and the shared data model

pub mod config;
pub mod models;
pub mod window;

// Re-export main types for convenience
pub use config::{ApiCredentials, AppConfig};
pub use models::{ChannelMessage, ChannelRef, DigestEntry, EntrySummary, RunOutcome, Summary};
pub use window::FetchWindow;
