use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::chat::{ChatMessage, GENERAL_CONVERSATION};
use crate::models::relationship::Relationship;
use crate::state::AppState;
use crate::store::{keys, load_json, remove_key, save_json};

pub const GREETING_ID: &str = "init";

/// Opening message shown for a conversation with no stored transcript.
pub fn greeting(user_name: &str, partner: Option<&str>, timestamp: DateTime<Utc>) -> ChatMessage {
    let text = match partner {
        Some(partner) => format!(
            "Hi! I'm Sona. Let's talk about you and {partner}. What's on your mind?"
        ),
        None if user_name.is_empty() => "Hi! I'm Sona. What would you like to talk about today?".to_string(),
        None => format!("Hi {user_name}! I'm Sona. What would you like to talk about today?"),
    };
    ChatMessage::sona(GREETING_ID.to_string(), text, timestamp)
}

impl AppState {
    /// `None` for the general conversation, otherwise the relationship the
    /// conversation belongs to.
    pub(crate) async fn conversation_relationship(
        &self,
        conversation: &str,
    ) -> Result<Option<Relationship>, AppError> {
        if conversation == GENERAL_CONVERSATION {
            return Ok(None);
        }
        self.relationship(conversation)
            .await
            .map(Some)
            .ok_or_else(|| AppError::NotFound(format!("Conversation {conversation} not found")))
    }

    pub async fn transcript(&self, conversation: &str) -> Result<Vec<ChatMessage>, AppError> {
        let relationship = self.conversation_relationship(conversation).await?;
        Ok(self
            .load_transcript(conversation, relationship.as_ref())
            .await)
    }

    pub(crate) async fn load_transcript(
        &self,
        conversation: &str,
        relationship: Option<&Relationship>,
    ) -> Vec<ChatMessage> {
        if let Some(messages) =
            load_json::<Vec<ChatMessage>>(self.store.as_ref(), &keys::chat(conversation)).await
        {
            return messages;
        }
        let user_name = self.profile().await.user_name;
        vec![greeting(
            &user_name,
            relationship.map(|r| r.partner_name.as_str()),
            self.now_utc(),
        )]
    }

    pub(crate) async fn save_transcript(&self, conversation: &str, messages: &[ChatMessage]) {
        save_json(self.store.as_ref(), &keys::chat(conversation), messages).await;
    }

    pub async fn clear_transcript(&self, conversation: &str) -> Result<(), AppError> {
        self.conversation_relationship(conversation).await?;
        remove_key(self.store.as_ref(), &keys::chat(conversation)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Sender;
    use crate::onboarding::draft::RelationshipDraft;
    use crate::state::testing::harness;
    use crate::store::KvStore;

    #[tokio::test]
    async fn test_missing_transcript_yields_greeting() {
        let h = harness();
        let messages = h.state.transcript(GENERAL_CONVERSATION).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, GREETING_ID);
        assert_eq!(messages[0].sender, Sender::Sona);
        // greeting is not persisted by reading
        assert!(h.stored(&keys::chat(GENERAL_CONVERSATION)).await.is_none());
    }

    #[tokio::test]
    async fn test_relationship_greeting_names_partner() {
        let h = harness();
        let rel = h
            .state
            .add_relationship(&RelationshipDraft {
                kind: Some("friend".into()),
                partner_name: "Mert".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let messages = h.state.transcript(&rel.id).await.unwrap();
        assert!(messages[0].text.contains("Mert"));
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_not_found() {
        let h = harness();
        assert!(matches!(
            h.state.transcript("nope").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            h.state.clear_transcript("nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_stored_transcript() {
        let h = harness();
        let key = keys::chat(GENERAL_CONVERSATION);
        h.store.set(&key, "[]").await.unwrap();
        assert!(h.state.transcript(GENERAL_CONVERSATION).await.unwrap().is_empty());

        h.state.clear_transcript(GENERAL_CONVERSATION).await.unwrap();
        assert!(h.stored(&key).await.is_none());
    }
}
