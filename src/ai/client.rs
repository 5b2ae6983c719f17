//! Gemini API client module
//!
//! One `generateContent` call per channel message, behind a fixed-interval
//! gate that keeps the run under the per-minute request quota.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::ai::models::{
    GenerateContentRequest, GenerateContentResponse, RequestContent, RequestPart,
};
use crate::core::models::Summary;
use crate::errors::SummarizeError;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Build the fixed prompt around one message's text. The template asks for
/// exactly three Korean lines, one sentence each, no numbering.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        "다음은 암호화폐/크립토 산업 관련 뉴스입니다.\n\
         이 내용을 한국어로 정확히 3줄로 요약해주세요.\n\
         각 줄은 한 문장으로, 핵심 정보만 간결하게 담아주세요.\n\
         번호나 불릿 포인트 없이 각 줄만 작성해주세요.\n\
         \n\
         뉴스 내용:\n\
         {text}\n\
         \n\
         3줄 요약:"
    )
}

/// Turns one message's text into a three-line synopsis. The pipeline
/// depends on this seam so tests can substitute canned summaries.
#[async_trait]
pub trait Summarizer {
    async fn summarize(&mut self, text: &str) -> Result<Summary, SummarizeError>;
}

/// Gemini-backed [`Summarizer`].
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    min_interval: Duration,
    last_request_at: Option<Instant>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: String, model: String, requests_per_minute: u32) -> Self {
        Self::with_base_url(API_BASE_URL.to_string(), api_key, model, requests_per_minute)
    }

    /// Like [`GeminiClient::new`] with an explicit API base URL, so tests
    /// can point the client at a local server.
    #[must_use]
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        model: String,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
            min_interval: Duration::from_secs(60) / requests_per_minute.max(1),
            last_request_at: None,
        }
    }

    /// Fixed-interval gate in front of the single outbound call site.
    async fn wait_for_quota(&mut self) {
        if let Some(last) = self.last_request_at {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                debug!("Waiting {:?} before next Gemini call", self.min_interval - elapsed);
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request_at = Some(Instant::now());
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&mut self, text: &str) -> Result<Summary, SummarizeError> {
        self.wait_for_quota().await;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: build_prompt(text),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        // Check status before parsing; a 429 here is the daily quota
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "Gemini API error");
            return Err(SummarizeError::Api(format!("{status}: {body}")));
        }

        let response = response.json::<GenerateContentResponse>().await?;
        let raw = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if raw.trim().is_empty() {
            return Err(SummarizeError::Empty);
        }
        Summary::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
        // 60000 rpm keeps the gate out of the way
        GeminiClient::with_base_url(
            server.url(),
            "test-key".to_string(),
            "gemini-1.5-flash".to_string(),
            60_000,
        )
    }

    fn three_line_body() -> String {
        json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "첫 줄입니다.\n둘째 줄입니다.\n셋째 줄입니다."}]
                }
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn summarize_returns_three_line_summary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Regex("뉴스 본문".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(three_line_body())
            .create_async()
            .await;

        let mut client = client_for(&server);
        let summary = client.summarize("뉴스 본문").await.unwrap();

        assert_eq!(
            summary.as_str(),
            "첫 줄입니다.\n둘째 줄입니다.\n셋째 줄입니다."
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn quota_exhaustion_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(429)
            .with_body(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let mut client = client_for(&server);
        let err = client.summarize("본문").await.unwrap_err();

        match err {
            SummarizeError::Api(message) => {
                assert!(message.contains("429"), "message was: {message}");
                assert!(message.contains("RESOURCE_EXHAUSTED"), "message was: {message}");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_candidates_is_an_empty_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let mut client = client_for(&server);
        let err = client.summarize("본문").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Empty));
    }

    #[tokio::test]
    async fn two_line_output_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "한 줄.\n두 줄."}]}}]
        })
        .to_string();
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let mut client = client_for(&server);
        let err = client.summarize("본문").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Malformed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn quota_gate_spaces_out_calls() {
        // 15 rpm → 4 seconds between call starts
        let mut client = GeminiClient::new("k".to_string(), "m".to_string(), 15);
        let begin = Instant::now();

        client.wait_for_quota().await;
        assert_eq!(begin.elapsed(), Duration::ZERO, "first call passes through");

        client.wait_for_quota().await;
        assert_eq!(begin.elapsed(), Duration::from_secs(4));

        client.wait_for_quota().await;
        assert_eq!(begin.elapsed(), Duration::from_secs(8));
    }
}
