//! All Gemini/LLM functionality

pub mod client;
pub mod models;

// Re-export main types for convenience
pub use client::{GeminiClient, Summarizer, build_prompt};
