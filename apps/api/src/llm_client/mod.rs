/// LLM client: the single point of entry for all Gemini calls in Sona.
///
/// No other module may call the generative-language API directly. Callers go
/// through the `ChatModel` trait so tests can script replies.
///
/// There is no automatic retry: a failed exchange is reported once and the
/// user may resend.
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::chat::{ChatMessage, Sender};
use crate::models::profile::CoachingGoal;
use crate::models::relationship::RelationshipType;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all coach replies.
pub const MODEL: &str = "gemini-2.0-flash";
const TEMPERATURE: f32 = 0.85;
const TOP_P: f32 = 0.95;
const TOP_K: u32 = 50;
const MAX_OUTPUT_TOKENS: u32 = 220;
/// How many prior messages are sent along with a new one.
pub const HISTORY_WINDOW: usize = 15;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Failure buckets shown to the user. Each has one fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorCategory {
    Network,
    NotFound,
    Forbidden,
    RateLimited,
    Unknown,
}

impl LlmErrorCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmErrorCategory::Network => {
                "Looks like there's a problem with your internet connection. Please check it and try again. 📶"
            }
            LlmErrorCategory::NotFound => {
                "The model could not be found. Please update the app or try again later. 🤖"
            }
            LlmErrorCategory::Forbidden => {
                "Authorization error. The API service may not be active yet. ⏳"
            }
            LlmErrorCategory::RateLimited => {
                "Too many requests were sent. Could you wait a little and try again? ⏳"
            }
            LlmErrorCategory::Unknown => {
                "I can't answer you right now. Please try again in a little while. 💕"
            }
        }
    }
}

impl LlmError {
    pub fn category(&self) -> LlmErrorCategory {
        match self {
            LlmError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                LlmErrorCategory::Network
            }
            LlmError::Api { status: 404, .. } => LlmErrorCategory::NotFound,
            LlmError::Api { status: 403, .. } => LlmErrorCategory::Forbidden,
            LlmError::Api { status: 429, .. } => LlmErrorCategory::RateLimited,
            _ => LlmErrorCategory::Unknown,
        }
    }
}

/// Token accounting reported alongside a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
    #[serde(default)]
    pub total_token_count: Option<u64>,
}

/// Who the user is and which relationship the conversation is about.
#[derive(Debug, Clone, Default)]
pub struct CoachContext {
    pub user_name: String,
    pub partner_name: Option<String>,
    pub relationship_type: Option<RelationshipType>,
    pub years: u32,
    pub months: u32,
    pub main_challenge: Option<String>,
    pub coaching_goal: Option<CoachingGoal>,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub context: CoachContext,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub usage_metadata: Option<UsageMetadata>,
}

/// The language-model collaborator: request in, text + usage out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
        let prompt = prompts::build_prompt(request);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text().ok_or(LlmError::EmptyContent)?;

        debug!(
            "LLM call succeeded: total_tokens={:?}",
            parsed.usage_metadata.and_then(|u| u.total_token_count)
        );

        Ok(ChatReply {
            text: sanitize_reply(&text),
            usage_metadata: parsed.usage_metadata,
        })
    }
}

/// Keeps only the most recent `HISTORY_WINDOW` turns.
pub fn recent_history(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    messages[start..].to_vec()
}

pub fn speaker_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "User",
        Sender::Sona => "Sona",
    }
}

fn parroting_phrase() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)diyorsun[.?,!]?").expect("static pattern"))
}

/// Strips the stock "you're saying" parroting phrase and double quotes the
/// model keeps producing despite the prompt.
pub fn sanitize_reply(text: &str) -> String {
    parroting_phrase()
        .replace_all(text, "")
        .replace('"', "")
        .trim()
        .to_string()
}
