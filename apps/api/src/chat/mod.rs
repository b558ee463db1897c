//! One chat exchange: gate, record, call the model, account for tokens.
//!
//! Steps run strictly in order within one send. Two sends for the same
//! conversation may interleave; each then rewrites the transcript from its own
//! copy and the later write wins.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{AppError, ValidationError};
use crate::llm_client::{recent_history, ChatRequest, CoachContext};
use crate::models::chat::ChatMessage;
use crate::models::new_id;
use crate::models::relationship::Relationship;
use crate::state::AppState;
use crate::usage::UsageSnapshot;

pub mod handlers;
pub mod transcript;

/// Clears the typing indicator however the exchange ends.
struct TypingGuard<'a> {
    state: &'a AppState,
}

impl<'a> TypingGuard<'a> {
    fn raise(state: &'a AppState) -> Self {
        state.set_typing(true);
        Self { state }
    }
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        self.state.set_typing(false);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    pub usage: UsageSnapshot,
}

impl AppState {
    pub async fn send_message(&self, conversation: &str, text: &str) -> Result<SendOutcome, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let relationship = self.conversation_relationship(conversation).await?;

        if !self.usage.check_token_limit() {
            info!("Daily token quota reached, rejecting message");
            return Err(AppError::DailyQuotaExceeded);
        }
        if !self.usage.check_minute_limit() {
            info!("Per-minute message limit reached, rejecting message");
            return Err(AppError::RateLimited);
        }
        self.usage.record_message_timestamp();

        let mut messages = self.load_transcript(conversation, relationship.as_ref()).await;
        let history = recent_history(&messages);
        let user_message = ChatMessage::user(new_id(), text.to_string(), self.now_utc());
        messages.push(user_message.clone());
        self.save_transcript(conversation, &messages).await;
        self.increment_message_count(1).await;

        let request = ChatRequest {
            message: text.to_string(),
            history,
            context: self.coach_context(relationship.as_ref()).await,
        };

        let reply = {
            let _typing = TypingGuard::raise(self);
            match self.llm.generate(&request).await {
                Ok(reply) => {
                    self.usage
                        .update_token_usage(reply.usage_metadata.as_ref())
                        .await;
                    ChatMessage::sona(new_id(), reply.text, self.now_utc())
                }
                Err(e) => {
                    warn!("Chat reply failed: {e}");
                    ChatMessage {
                        is_error: true,
                        ..ChatMessage::sona(
                            new_id(),
                            e.category().user_message().to_string(),
                            self.now_utc(),
                        )
                    }
                }
            }
        };

        messages.push(reply.clone());
        self.save_transcript(conversation, &messages).await;
        if !reply.is_error {
            self.increment_message_count(1).await;
        }

        Ok(SendOutcome {
            user_message,
            reply,
            usage: self.usage.snapshot(),
        })
    }

    async fn coach_context(&self, relationship: Option<&Relationship>) -> CoachContext {
        let data = self.data.read().await;
        CoachContext {
            user_name: data.profile.user_name.clone(),
            partner_name: relationship.map(|r| r.partner_name.clone()),
            relationship_type: relationship.map(|r| r.kind),
            years: relationship.map_or(0, |r| r.years),
            months: relationship.map_or(0, |r| r.months),
            main_challenge: relationship
                .map(|r| r.main_challenge.clone())
                .filter(|c| !c.is_empty()),
            coaching_goal: data.profile.coaching_goal,
            language: data.settings.language.clone(),
        }
    }
}
