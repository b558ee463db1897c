use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::new_id;
use crate::models::tracking::{DailyMood, Mood};
use crate::state::AppState;
use crate::store::{keys, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wellbeing {
    pub score: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSummary {
    pub wellbeing: Wellbeing,
    pub streak: u32,
    pub today: Option<Mood>,
}

/// Rounded all-time average. The trend only turns down when the latest entry
/// scores strictly lower than the one before it.
pub fn wellbeing(moods: &[DailyMood]) -> Wellbeing {
    if moods.is_empty() {
        return Wellbeing {
            score: 0,
            trend: Trend::Up,
        };
    }

    let mut sorted: Vec<&DailyMood> = moods.iter().collect();
    sorted.sort_by_key(|m| m.date);

    let total: u32 = sorted.iter().map(|m| m.mood.score()).sum();
    let score = (f64::from(total) / sorted.len() as f64).round() as u32;

    let trend = match sorted.as_slice() {
        [.., prev, last] if last.mood.score() < prev.mood.score() => Trend::Down,
        _ => Trend::Up,
    };
    Wellbeing { score, trend }
}

/// Consecutive days with an entry, ending today or, failing that, yesterday.
pub fn streak(moods: &[DailyMood], today: NaiveDate) -> u32 {
    let has = |date: NaiveDate| moods.iter().any(|m| m.date == date);

    let mut day = if has(today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut count = 0;
    while has(day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

impl AppState {
    pub async fn daily_moods(&self) -> Vec<DailyMood> {
        self.data.read().await.daily_moods.clone()
    }

    /// Records today's mood, replacing any earlier entry for today.
    pub async fn add_daily_mood(&self, mood: Mood) -> DailyMood {
        let entry = DailyMood {
            id: new_id(),
            date: self.clock.today(),
            mood,
            timestamp: self.now_utc(),
        };

        let list = {
            let mut data = self.data.write().await;
            data.daily_moods.retain(|m| m.date != entry.date);
            data.daily_moods.push(entry.clone());
            data.daily_moods.clone()
        };
        save_json(self.store.as_ref(), keys::DAILY_MOODS, &list).await;
        entry
    }

    pub async fn mood_summary(&self) -> MoodSummary {
        let today = self.clock.today();
        let data = self.data.read().await;
        MoodSummary {
            wellbeing: wellbeing(&data.daily_moods),
            streak: streak(&data.daily_moods, today),
            today: data
                .daily_moods
                .iter()
                .find(|m| m.date == today)
                .map(|m| m.mood),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::harness;
    use chrono::Utc;

    fn entry(date: NaiveDate, mood: Mood) -> DailyMood {
        DailyMood {
            id: new_id(),
            date,
            mood,
            timestamp: Utc::now(),
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn test_wellbeing_empty() {
        assert_eq!(
            wellbeing(&[]),
            Wellbeing {
                score: 0,
                trend: Trend::Up
            }
        );
    }

    #[test]
    fn test_wellbeing_average_and_trend() {
        let moods = vec![
            entry(d(3), Mood::Low),
            entry(d(1), Mood::Loving),
            entry(d(2), Mood::Good),
        ];
        // (100 + 80 + 40) / 3 = 73.3
        assert_eq!(
            wellbeing(&moods),
            Wellbeing {
                score: 73,
                trend: Trend::Down
            }
        );

        let flat = vec![entry(d(1), Mood::Neutral), entry(d(2), Mood::Neutral)];
        assert_eq!(wellbeing(&flat).trend, Trend::Up);
    }

    #[test]
    fn test_wellbeing_rounds_half_up() {
        let mut moods: Vec<DailyMood> = (1..=7).map(|day| entry(d(day), Mood::Angry)).collect();
        moods.push(entry(d(8), Mood::Low));
        // 180 / 8 = 22.5
        assert_eq!(wellbeing(&moods).score, 23);
    }

    #[test]
    fn test_streak() {
        let moods = vec![
            entry(d(1), Mood::Good),
            entry(d(2), Mood::Good),
            entry(d(3), Mood::Good),
            entry(d(5), Mood::Good),
        ];
        assert_eq!(streak(&moods, d(5)), 1);
        assert_eq!(streak(&moods, d(4)), 3);
        assert_eq!(streak(&moods, d(3)), 3);
        assert_eq!(streak(&moods, d(7)), 0);
        assert_eq!(streak(&[], d(7)), 0);
    }

    #[tokio::test]
    async fn test_same_day_mood_is_replaced() {
        let h = harness();
        h.state.add_daily_mood(Mood::Angry).await;
        h.clock.advance(Duration::hours(2));
        let second = h.state.add_daily_mood(Mood::Loving).await;

        let moods = h.state.daily_moods().await;
        assert_eq!(moods, vec![second]);

        let stored: Vec<DailyMood> =
            serde_json::from_str(&h.stored(keys::DAILY_MOODS).await.unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].mood, Mood::Loving);
    }

    #[tokio::test]
    async fn test_summary_tracks_consecutive_days() {
        let h = harness();
        h.state.add_daily_mood(Mood::Good).await;
        h.clock.advance(Duration::days(1));
        h.state.add_daily_mood(Mood::Low).await;

        let summary = h.state.mood_summary().await;
        assert_eq!(summary.streak, 2);
        assert_eq!(summary.today, Some(Mood::Low));
        assert_eq!(summary.wellbeing.score, 60);
        assert_eq!(summary.wellbeing.trend, Trend::Down);
    }
}
