use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::SummarizeError;

/// Number of source characters kept when summarization fails and the
/// digest falls back to an excerpt of the original text.
const EXCERPT_MAX_CHARS: usize = 200;

/// Target channel as configured: a public username or a numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Name(String),
    Id(i64),
}

impl ChannelRef {
    /// Accepts a bare name, `@name`, a `t.me` link, or a numeric id.
    /// Returns `None` when nothing usable is left after cleanup.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut cleaned = raw.trim();
        for prefix in ["https://t.me/", "http://t.me/", "t.me/"] {
            if let Some(rest) = cleaned.strip_prefix(prefix) {
                cleaned = rest;
                break;
            }
        }
        let cleaned = cleaned.trim_start_matches('@').trim_end_matches('/').trim();

        if cleaned.is_empty() {
            return None;
        }
        if let Ok(id) = cleaned.parse::<i64>() {
            return Some(Self::Id(normalize_channel_id(id)));
        }
        Some(Self::Name(cleaned.to_string()))
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Name(name) => f.write_str(name),
            ChannelRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Bot-API style `-100XXXXXXXXXX` ids refer to the same channel as the
/// bare positive id.
fn normalize_channel_id(id: i64) -> i64 {
    if id >= 0 {
        return id;
    }
    let text = id.to_string();
    text.strip_prefix("-100")
        .and_then(|bare| bare.parse::<i64>().ok())
        .unwrap_or_else(|| id.saturating_abs())
}

/// One text post fetched from the source channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    /// Permalink back to the post, when the channel form allows building one.
    pub link: Option<String>,
}

/// A generated synopsis. Always exactly three newline-joined lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary(String);

impl Summary {
    /// Validate raw model output into the three-line shape.
    ///
    /// Blank lines are dropped and each line is trimmed. Output with more
    /// than three remaining lines is clipped to the first three; fewer is
    /// malformed and nothing at all is an empty response.
    pub fn parse(raw: &str) -> Result<Self, SummarizeError> {
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(SummarizeError::Empty);
        }
        if lines.len() < 3 {
            return Err(SummarizeError::Malformed(format!(
                "expected 3 lines, got {}",
                lines.len()
            )));
        }

        Ok(Self(lines[..3].join("\n")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Summary slot of one digest entry.
#[derive(Debug, Clone)]
pub enum EntrySummary {
    /// The three-line synopsis came back from the model.
    Generated(Summary),
    /// Summarization failed; the digest shows the start of the source text.
    Excerpt(String),
}

impl EntrySummary {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            EntrySummary::Generated(summary) => summary.as_str(),
            EntrySummary::Excerpt(excerpt) => excerpt,
        }
    }
}

/// One line item of the daily digest, in fetch order.
#[derive(Debug, Clone)]
pub struct DigestEntry {
    pub message: ChannelMessage,
    pub summary: EntrySummary,
}

/// What a completed pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The window held no messages; nothing was posted.
    Empty,
    /// The digest went out.
    Delivered {
        messages: usize,
        fallbacks: usize,
        posts: usize,
    },
}

/// Excerpt of `text` used as the fallback summary, cut at a character
/// boundary with a trailing ellipsis when anything was dropped.
#[must_use]
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_MAX_CHARS).collect();
    format!("{cut}...")
}
