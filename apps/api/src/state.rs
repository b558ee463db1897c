use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::clock::Clock;
use crate::llm_client::ChatModel;
use crate::models::profile::Profile;
use crate::models::relationship::Relationship;
use crate::models::tracking::{DailyMood, SavedAdvice, SpecialDate};
use crate::notifications::Notifier;
use crate::onboarding::draft::DraftSession;
use crate::profile::{is_supported_language, Settings};
use crate::store::{keys, load_json, load_string, KvStore};
use crate::usage::{UsageGovernor, UsageLimits};

/// Everything the user owns, as last loaded or written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub profile: Profile,
    pub relationships: Vec<Relationship>,
    pub special_dates: Vec<SpecialDate>,
    pub daily_moods: Vec<DailyMood>,
    pub saved_advice: Vec<SavedAdvice>,
    pub total_message_count: u64,
    pub settings: Settings,
}

impl UserData {
    pub fn fresh(registration_date: DateTime<Utc>, language: &str) -> Self {
        Self {
            profile: Profile::empty(registration_date),
            relationships: Vec::new(),
            special_dates: Vec::new(),
            daily_moods: Vec::new(),
            saved_advice: Vec::new(),
            total_message_count: 0,
            settings: Settings::with_language(language),
        }
    }
}

/// The single long-lived state container. Constructed once at startup and
/// shared with every route handler as `SharedState`.
///
/// Writes are optimistic: the in-memory copy is updated first, then the
/// affected key is persisted. A failed write leaves memory ahead of storage
/// until the next successful write of that key. Locks are never held across
/// a store call, so concurrent writers to the same key race and the last
/// write wins.
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub llm: Arc<dyn ChatModel>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub usage: UsageGovernor,
    pub(crate) default_language: String,
    pub(crate) data: RwLock<UserData>,
    draft: Mutex<DraftSession>,
    typing: AtomicBool,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        llm: Arc<dyn ChatModel>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        limits: UsageLimits,
        default_language: &str,
    ) -> Self {
        let usage = UsageGovernor::new(store.clone(), clock.clone(), limits);
        let data = UserData::fresh(clock.now().with_timezone(&Utc), default_language);

        Self {
            store,
            llm,
            notifier,
            clock,
            usage,
            default_language: default_language.to_string(),
            data: RwLock::new(data),
            draft: Mutex::new(DraftSession::default()),
            typing: AtomicBool::new(false),
        }
    }

    /// Reads everything persisted back into memory. Missing or unreadable
    /// keys fall back to empty values; nothing here fails.
    pub async fn load(&self) {
        let store = self.store.as_ref();
        let now = self.clock.now().with_timezone(&Utc);

        let profile = load_json::<Profile>(store, keys::USER_DATA)
            .await
            .unwrap_or_else(|| Profile::empty(now));
        let relationships: Vec<Relationship> = load_json(store, keys::RELATIONSHIPS)
            .await
            .unwrap_or_default();
        let special_dates: Vec<SpecialDate> = load_json(store, keys::SPECIAL_DATES)
            .await
            .unwrap_or_default();
        let daily_moods = load_json(store, keys::DAILY_MOODS).await.unwrap_or_default();
        let saved_advice = load_json(store, keys::SAVED_ADVICE)
            .await
            .unwrap_or_default();
        let total_message_count = load_string(store, keys::TOTAL_MESSAGE_COUNT)
            .await
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let language = load_string(store, keys::USER_LANGUAGE)
            .await
            .filter(|lang| is_supported_language(lang))
            .unwrap_or_else(|| self.default_language.clone());
        let privacy_lock_enabled = load_string(store, keys::PRIVACY_LOCK_ENABLED)
            .await
            .map(|raw| raw.trim() == "true")
            .unwrap_or(false);
        let notifications_enabled = load_string(store, keys::NOTIFICATIONS_ENABLED)
            .await
            .map(|raw| raw.trim() == "true")
            .unwrap_or(true);

        info!(
            "Loaded profile with {} relationship(s), {} special date(s)",
            relationships.len(),
            special_dates.len()
        );

        *self.data.write().await = UserData {
            profile,
            relationships,
            special_dates,
            daily_moods,
            saved_advice,
            total_message_count,
            settings: Settings {
                language,
                privacy_lock_enabled,
                notifications_enabled,
            },
        };

        self.usage.load_usage().await;
    }

    pub async fn snapshot(&self) -> UserData {
        self.data.read().await.clone()
    }

    pub(crate) fn draft_session(&self) -> MutexGuard<'_, DraftSession> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_typing(&self, typing: bool) {
        self.typing.store(typing, Ordering::SeqCst);
    }

    pub(crate) fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::clock::testing::local;
    use crate::clock::testing::ManualClock;
    use crate::llm_client::{ChatReply, ChatRequest, LlmError, UsageMetadata};
    use crate::notifications::testing::RecordingNotifier;
    use crate::store::MemoryStore;

    /// Replays queued outcomes; falls back to a fixed reply when empty.
    #[derive(Default)]
    pub struct ScriptedModel {
        pub replies: Mutex<VecDeque<Result<ChatReply, LlmError>>>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedModel {
        pub fn push_reply(&self, text: &str, tokens: Option<u64>) {
            self.replies.lock().unwrap().push_back(Ok(ChatReply {
                text: text.to_string(),
                usage_metadata: tokens.map(|t| UsageMetadata {
                    total_token_count: Some(t),
                    ..Default::default()
                }),
            }));
        }

        pub fn push_error(&self, error: LlmError) {
            self.replies.lock().unwrap().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(ChatReply {
                    text: "I'm here for you.".into(),
                    usage_metadata: None,
                })
            })
        }
    }

    pub struct Harness {
        pub state: SharedState,
        pub store: Arc<MemoryStore>,
        pub clock: Arc<ManualClock>,
        pub model: Arc<ScriptedModel>,
        pub notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        pub async fn stored(&self, key: &str) -> Option<String> {
            self.store.get(key).await.unwrap()
        }
    }

    pub fn harness_with(store: Arc<MemoryStore>, notifier: RecordingNotifier) -> Harness {
        let clock = Arc::new(ManualClock::new(local(2025, 6, 2, 10, 0, 0)));
        let model = Arc::new(ScriptedModel::default());
        let notifier = Arc::new(notifier);
        let state = Arc::new(AppState::new(
            store.clone(),
            model.clone(),
            notifier.clone(),
            clock.clone(),
            UsageLimits::default(),
            "en",
        ));
        Harness {
            state,
            store,
            clock,
            model,
            notifier,
        }
    }

    pub fn harness() -> Harness {
        harness_with(Arc::new(MemoryStore::new()), RecordingNotifier::default())
    }
}
