use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{AppError, ValidationError};
use crate::models::new_id;
use crate::models::tracking::SpecialDate;
use crate::state::AppState;
use crate::store::{keys, save_json};

/// Upper day bound per month, 1-based. February is always 29.
pub const DAYS_IN_MONTH: [u32; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub const REMINDER_HOUR: u32 = 9;
pub const REMINDER_TITLE: &str = "Sona: A special day today! ✨";

/// A 29 February can be up to eight years out across a skipped century leap.
const MAX_YEARS_AHEAD: i32 = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecialDate {
    pub title: String,
    pub day: u32,
    pub month: u32,
    #[serde(default)]
    pub relationship_id: Option<String>,
}

pub fn validate(new: &NewSpecialDate) -> Result<(), ValidationError> {
    if new.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let invalid = ValidationError::InvalidDate {
        day: new.day,
        month: new.month,
    };
    if !(1..=12).contains(&new.month) {
        return Err(invalid);
    }
    if new.day < 1 || new.day > DAYS_IN_MONTH[new.month as usize] {
        return Err(invalid);
    }
    Ok(())
}

/// Next 09:00 local on `day`/`month` strictly after `now`.
pub fn next_occurrence(day: u32, month: u32, now: DateTime<Local>) -> Option<DateTime<Local>> {
    (now.year()..=now.year() + MAX_YEARS_AHEAD)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .filter_map(|date| date.and_hms_opt(REMINDER_HOUR, 0, 0))
        .filter_map(|naive| Local.from_local_datetime(&naive).earliest())
        .find(|trigger| *trigger > now)
}

pub fn reminder_body(title: &str, partner_name: Option<&str>) -> String {
    match partner_name {
        Some(partner) => format!(
            "Reminder: today is \"{title}\" for {partner}! 🎉 How about a nice surprise? ❤️"
        ),
        None => format!("Reminder: today is \"{title}\"! 🎉 How about a nice surprise? ❤️"),
    }
}

impl AppState {
    pub async fn special_dates(&self) -> Vec<SpecialDate> {
        self.data.read().await.special_dates.clone()
    }

    pub(crate) async fn special_dates_for(&self, relationship_id: &str) -> Vec<SpecialDate> {
        self.data
            .read()
            .await
            .special_dates
            .iter()
            .filter(|d| d.relationship_id.as_deref() == Some(relationship_id))
            .cloned()
            .collect()
    }

    /// Stores the date and schedules its yearly reminder. A scheduling
    /// failure is logged and the date is kept without a notification id.
    pub async fn add_special_date(&self, new: &NewSpecialDate) -> Result<SpecialDate, AppError> {
        validate(new)?;

        let partner = match &new.relationship_id {
            Some(id) => self.relationship(id).await.map(|r| r.partner_name),
            None => None,
        };
        let body = reminder_body(new.title.trim(), partner.as_deref());

        let notification_id = match next_occurrence(new.day, new.month, self.clock.now()) {
            Some(trigger) => match self.notifier.schedule(REMINDER_TITLE, &body, trigger).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Could not schedule reminder for '{}': {e}", new.title);
                    None
                }
            },
            None => None,
        };

        let date = SpecialDate {
            id: new_id(),
            title: new.title.trim().to_string(),
            day: new.day,
            month: new.month,
            relationship_id: new.relationship_id.clone(),
            notification_id,
        };

        let list = {
            let mut data = self.data.write().await;
            data.special_dates.push(date.clone());
            data.special_dates.clone()
        };
        save_json(self.store.as_ref(), keys::SPECIAL_DATES, &list).await;

        info!("Added special date {} on {}/{}", date.id, date.day, date.month);
        Ok(date)
    }

    /// Cancels the reminder (best-effort) and drops the date. Returns false
    /// when no such date exists.
    pub async fn delete_special_date(&self, id: &str) -> bool {
        let (removed, list) = {
            let mut data = self.data.write().await;
            let Some(pos) = data.special_dates.iter().position(|d| d.id == id) else {
                return false;
            };
            let removed = data.special_dates.remove(pos);
            (removed, data.special_dates.clone())
        };

        if let Some(notification_id) = &removed.notification_id {
            if let Err(e) = self.notifier.cancel(notification_id).await {
                warn!("Could not cancel reminder {notification_id}: {e}");
            }
        }

        save_json(self.store.as_ref(), keys::SPECIAL_DATES, &list).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::testing::local;
    use crate::notifications::testing::RecordingNotifier;
    use crate::onboarding::draft::RelationshipDraft;
    use crate::state::testing::{harness, harness_with};
    use crate::store::MemoryStore;

    fn new_date(title: &str, day: u32, month: u32) -> NewSpecialDate {
        NewSpecialDate {
            title: title.into(),
            day,
            month,
            relationship_id: None,
        }
    }

    #[test]
    fn test_validation_bounds() {
        assert!(validate(&new_date("Anniversary", 31, 1)).is_ok());
        assert!(validate(&new_date("Leap", 29, 2)).is_ok());
        assert_eq!(
            validate(&new_date("Bad", 30, 2)),
            Err(ValidationError::InvalidDate { day: 30, month: 2 })
        );
        assert_eq!(
            validate(&new_date("Bad", 31, 4)),
            Err(ValidationError::InvalidDate { day: 31, month: 4 })
        );
        assert_eq!(
            validate(&new_date("Bad", 1, 13)),
            Err(ValidationError::InvalidDate { day: 1, month: 13 })
        );
        assert_eq!(
            validate(&new_date("Bad", 0, 5)),
            Err(ValidationError::InvalidDate { day: 0, month: 5 })
        );
        assert_eq!(validate(&new_date("  ", 1, 1)), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_next_occurrence_this_year_or_next() {
        let now = local(2025, 6, 2, 10, 0, 0);
        assert_eq!(next_occurrence(14, 9, now), Some(local(2025, 9, 14, 9, 0, 0)));
        assert_eq!(next_occurrence(1, 1, now), Some(local(2026, 1, 1, 9, 0, 0)));
        // same day, reminder hour already passed
        assert_eq!(next_occurrence(2, 6, now), Some(local(2026, 6, 2, 9, 0, 0)));
        let early = local(2025, 6, 2, 8, 0, 0);
        assert_eq!(next_occurrence(2, 6, early), Some(local(2025, 6, 2, 9, 0, 0)));
    }

    #[test]
    fn test_leap_day_waits_for_leap_year() {
        let now = local(2025, 6, 2, 10, 0, 0);
        assert_eq!(next_occurrence(29, 2, now), Some(local(2028, 2, 29, 9, 0, 0)));
    }

    #[test]
    fn test_body_names_partner() {
        assert!(reminder_body("Birthday", Some("Ana")).contains("for Ana"));
        assert!(!reminder_body("Birthday", None).contains(" for "));
    }

    #[tokio::test]
    async fn test_add_schedules_reminder() {
        let h = harness();
        let rel = h
            .state
            .add_relationship(&RelationshipDraft {
                kind: Some("romantic".into()),
                partner_name: "Ana".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let date = h
            .state
            .add_special_date(&NewSpecialDate {
                relationship_id: Some(rel.id.clone()),
                ..new_date("Anniversary", 14, 9)
            })
            .await
            .unwrap();

        let scheduled = h.notifier.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(date.notification_id.as_deref(), Some(scheduled[0].id.as_str()));
        assert_eq!(scheduled[0].trigger, local(2025, 9, 14, 9, 0, 0));
        assert!(scheduled[0].body.contains("Ana"));

        let stored: Vec<SpecialDate> =
            serde_json::from_str(&h.stored(keys::SPECIAL_DATES).await.unwrap()).unwrap();
        assert_eq!(stored, vec![date]);
    }

    #[tokio::test]
    async fn test_scheduler_failure_keeps_date() {
        let h = harness_with(Arc::new(MemoryStore::new()), RecordingNotifier::failing());
        let date = h.state.add_special_date(&new_date("Birthday", 3, 3)).await.unwrap();
        assert!(date.notification_id.is_none());
        assert_eq!(h.state.special_dates().await.len(), 1);

        // cancel fails too; deletion still goes through
        assert!(h.state.delete_special_date(&date.id).await);
        assert!(h.state.special_dates().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date_writes_nothing() {
        let h = harness();
        let err = h.state.add_special_date(&new_date("Bad", 30, 2)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidDate { .. })
        ));
        assert!(h.notifier.scheduled().is_empty());
        assert!(h.stored(keys::SPECIAL_DATES).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_cancels_reminder() {
        let h = harness();
        let date = h.state.add_special_date(&new_date("Birthday", 3, 3)).await.unwrap();
        assert!(h.state.delete_special_date(&date.id).await);
        assert_eq!(h.notifier.cancelled(), vec![date.notification_id.unwrap()]);
        assert_eq!(h.stored(keys::SPECIAL_DATES).await.as_deref(), Some("[]"));
        assert!(!h.state.delete_special_date(&date.id).await);
    }
}
