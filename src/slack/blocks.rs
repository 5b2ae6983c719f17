//! Digest rendering into Block Kit payloads.

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::models::DigestEntry;
use crate::core::window::FetchWindow;

/// Slack rejects messages with more than 50 blocks.
const MAX_BLOCKS_PER_MESSAGE: usize = 50;

/// One webhook payload: notification fallback text plus the blocks.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookMessage {
    pub text: String,
    pub blocks: Vec<Value>,
}

/// Render the digest into one or more webhook payloads.
///
/// Entries keep their chronological order and continuous numbering. When
/// the block limit would be exceeded the digest splits at an entry
/// boundary; continuation payloads repeat the header with a `(계속)`
/// marker and the footer appears only on the final payload.
#[must_use]
pub fn render_digest(
    channel: &str,
    window: &FetchWindow,
    entries: &[DigestEntry],
) -> Vec<WebhookMessage> {
    if entries.is_empty() {
        return Vec::new();
    }

    let date_label = window.day().format("%Y년 %m월 %d일").to_string();
    let title = format!("📰 {channel} 일간 크립토 뉴스 요약 - {date_label}");
    let continuation_title = format!("{title} (계속)");
    let tz = window.timezone();

    let mut messages: Vec<WebhookMessage> = Vec::new();
    let mut current_text = title.clone();
    let mut current = header_blocks(&title);
    let mut entries_in_chunk = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        let group = entry_blocks(idx + 1, entry, tz);

        // One slot stays reserved for the footer on the final payload
        let cost = group.len() + usize::from(entries_in_chunk > 0);
        if current.len() + cost > MAX_BLOCKS_PER_MESSAGE - 1 {
            messages.push(WebhookMessage {
                text: current_text.clone(),
                blocks: std::mem::take(&mut current),
            });
            current_text = continuation_title.clone();
            current = header_blocks(&continuation_title);
            entries_in_chunk = 0;
        }

        if entries_in_chunk > 0 {
            current.push(json!({ "type": "divider" }));
        }
        current.extend(group);
        entries_in_chunk += 1;
    }

    current.push(footer_block(entries.len()));
    messages.push(WebhookMessage {
        text: current_text,
        blocks: current,
    });

    messages
}

fn header_blocks(title: &str) -> Vec<Value> {
    vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": title, "emoji": true }
        }),
        json!({ "type": "divider" }),
    ]
}

fn entry_blocks(position: usize, entry: &DigestEntry, tz: Tz) -> Vec<Value> {
    let time_label = entry.message.timestamp.with_timezone(&tz).format("%H:%M");

    let mut group = vec![json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!("*{position}. [{time_label}] 뉴스*\n{}", entry.summary.text())
        }
    })];

    if let Some(link) = &entry.message.link {
        group.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("<{link}|📎 원문 보기>") }
        }));
    }

    group
}

fn footer_block(total: usize) -> Value {
    json!({
        "type": "context",
        "elements": [
            { "type": "mrkdwn", "text": format!("총 {total}개의 뉴스 | Powered by Google Gemini") }
        ]
    })
}
