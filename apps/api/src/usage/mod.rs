//! Usage governor. Keeps the paid language-model backend from being drained.
//!
//! Two independent limits:
//! - a daily token quota, reconciled across calendar-day rollovers and restarts
//! - a rolling 60-second message window
//!
//! Call protocol (the chat flow follows it): `check_token_limit`, then
//! `check_minute_limit`; if both pass, `record_message_timestamp` before the
//! model call; `update_token_usage` with the returned metadata on success.
//!
//! The check and the record are separate calls with no lock spanning both, so
//! two sends racing each other can both pass the minute check against the same
//! window and be admitted together. That over-admission is tolerated.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{format_date, parse_date, Clock};
use crate::llm_client::UsageMetadata;
use crate::store::{keys, load_string, save_string, KvStore};

pub mod handlers;

pub const DEFAULT_MAX_DAILY_TOKENS: u64 = 50_000;
pub const DEFAULT_MAX_MESSAGES_PER_MINUTE: usize = 10;
const WINDOW_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageLimits {
    pub max_daily_tokens: u64,
    pub max_messages_per_minute: usize,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            max_daily_tokens: DEFAULT_MAX_DAILY_TOKENS,
            max_messages_per_minute: DEFAULT_MAX_MESSAGES_PER_MINUTE,
        }
    }
}

#[derive(Debug)]
struct UsageState {
    daily_token_usage: u64,
    last_usage_date: NaiveDate,
    /// Epoch millis of recent sends. In memory only.
    recent_message_timestamps: VecDeque<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub daily_token_usage: u64,
    pub last_usage_date: NaiveDate,
    pub max_daily_tokens: u64,
    pub max_messages_per_minute: usize,
    pub messages_in_window: usize,
}

pub struct UsageGovernor {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    limits: UsageLimits,
    state: Mutex<UsageState>,
}

impl UsageGovernor {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, limits: UsageLimits) -> Self {
        let today = clock.today();
        Self {
            store,
            clock,
            limits,
            state: Mutex::new(UsageState {
                daily_token_usage: 0,
                last_usage_date: today,
                recent_message_timestamps: VecDeque::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, UsageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restores today's counter, or eagerly rolls over to a fresh day.
    pub async fn load_usage(&self) {
        let today = self.clock.today();
        let stored_date = load_string(self.store.as_ref(), keys::LAST_USAGE_DATE)
            .await
            .and_then(|raw| parse_date(&raw));

        if stored_date == Some(today) {
            let usage = load_string(self.store.as_ref(), keys::DAILY_TOKEN_USAGE)
                .await
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .unwrap_or(0);
            {
                let mut state = self.state();
                state.daily_token_usage = usage;
                state.last_usage_date = today;
            }
            info!("Restored daily token usage: {usage}");
            return;
        }

        {
            let mut state = self.state();
            state.daily_token_usage = 0;
            state.last_usage_date = today;
        }
        info!("New usage day {today}, token counter reset");
        save_string(self.store.as_ref(), keys::LAST_USAGE_DATE, &format_date(today)).await;
        save_string(self.store.as_ref(), keys::DAILY_TOKEN_USAGE, "0").await;
    }

    /// Read-only quota check. A pending rollover (stored day is not today)
    /// counts as under the limit; `update_token_usage` performs the reset.
    pub fn check_token_limit(&self) -> bool {
        let today = self.clock.today();
        let state = self.state();
        if state.last_usage_date != today {
            return true;
        }
        state.daily_token_usage < self.limits.max_daily_tokens
    }

    /// True while fewer than the allowed number of sends fall inside the last
    /// 60 seconds. Does not prune the window.
    pub fn check_minute_limit(&self) -> bool {
        let cutoff = self.clock.now_millis() - WINDOW_MS;
        let state = self.state();
        let recent = state
            .recent_message_timestamps
            .iter()
            .filter(|&&ts| ts > cutoff)
            .count();
        recent < self.limits.max_messages_per_minute
    }

    /// Counts a send attempt and prunes entries that left the window.
    pub fn record_message_timestamp(&self) {
        let now = self.clock.now_millis();
        let cutoff = now - WINDOW_MS;
        let mut state = self.state();
        state.recent_message_timestamps.push_back(now);
        state.recent_message_timestamps.retain(|&ts| ts > cutoff);
    }

    /// Adds a completed exchange's tokens to today's counter, zeroing it first
    /// when the day has rolled over since the last update.
    pub async fn update_token_usage(&self, usage: Option<&UsageMetadata>) {
        let Some(tokens) = usage.and_then(|u| u.total_token_count).filter(|&t| t > 0) else {
            return;
        };

        let today = self.clock.today();
        let (rolled_over, total) = {
            let mut state = self.state();
            let rolled_over = state.last_usage_date != today;
            if rolled_over {
                state.daily_token_usage = 0;
                state.last_usage_date = today;
            }
            state.daily_token_usage = state.daily_token_usage.saturating_add(tokens);
            (rolled_over, state.daily_token_usage)
        };

        if rolled_over {
            info!("Usage day rolled over to {today}");
            save_string(self.store.as_ref(), keys::LAST_USAGE_DATE, &format_date(today)).await;
        }
        debug!("Daily token usage now {total} (+{tokens})");
        save_string(self.store.as_ref(), keys::DAILY_TOKEN_USAGE, &total.to_string()).await;
    }

    /// Writes the current counter and date back to the store.
    pub async fn persist(&self) {
        let (date, total) = {
            let state = self.state();
            (state.last_usage_date, state.daily_token_usage)
        };
        save_string(self.store.as_ref(), keys::LAST_USAGE_DATE, &format_date(date)).await;
        save_string(self.store.as_ref(), keys::DAILY_TOKEN_USAGE, &total.to_string()).await;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let cutoff = self.clock.now_millis() - WINDOW_MS;
        let state = self.state();
        UsageSnapshot {
            daily_token_usage: state.daily_token_usage,
            last_usage_date: state.last_usage_date,
            max_daily_tokens: self.limits.max_daily_tokens,
            max_messages_per_minute: self.limits.max_messages_per_minute,
            messages_in_window: state
                .recent_message_timestamps
                .iter()
                .filter(|&&ts| ts > cutoff)
                .count(),
        }
    }
}
