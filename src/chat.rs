use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// ChatError
///
/// Failures of the upstream LLM call. All of them surface to the client as 502.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat relay is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat API answered {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("chat API returned no candidates")]
    EmptyReply,
}

// 1. ChatRelay Contract
/// ChatRelay
///
/// Forwards a single user message to an external LLM and returns its text
/// answer. `GeminiClient` talks to the real API; `MockChatRelay` is used in tests.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ChatError>;
}

// --- Gemini wire format (generateContent) ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// 2. The Real Implementation
/// GeminiClient
///
/// Calls `POST {base_url}?key={api_key}` with a single-turn `contents` payload.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatRelay for GeminiClient {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ChatError::NotConfigured("GEMINI_API_KEY is not set"))?;

        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: message }],
            }],
        };

        let response = self
            .http
            .post(&self.base_url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat API returned an error");
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(ChatError::EmptyReply)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockChatRelay
///
/// Echoes the message back, or fails when `should_fail` is set.
#[derive(Clone, Default)]
pub struct MockChatRelay {
    pub should_fail: bool,
}

impl MockChatRelay {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl ChatRelay for MockChatRelay {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        if self.should_fail {
            return Err(ChatError::EmptyReply);
        }
        Ok(format!("echo: {message}"))
    }
}

/// ChatState
///
/// The shared chat relay stored in the application state.
pub type ChatState = Arc<dyn ChatRelay>;
