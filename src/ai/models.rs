//! Wire types for the Gemini `generateContent` endpoint.

#[derive(serde::Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(serde::Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(serde::Serialize)]
pub struct RequestPart {
    pub text: String,
}

#[derive(serde::Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(serde::Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// Response parts can be non-text (e.g. function calls), so `text` stays
/// optional.
#[derive(serde::Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}
