//! Telegram channel access over MTProto

pub mod client;
pub mod session;

// Re-export main types for convenience
pub use client::{ChannelClient, MessageSource};
