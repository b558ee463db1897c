use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A recurring yearly date (anniversary, birthday) with an optional reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDate {
    pub id: String,
    pub title: String,
    pub day: u32,
    pub month: u32,
    #[serde(default)]
    pub relationship_id: Option<String>,
    #[serde(default)]
    pub notification_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "😍")]
    Loving,
    #[serde(rename = "🙂")]
    Good,
    #[serde(rename = "😐")]
    Neutral,
    #[serde(rename = "😕")]
    Low,
    #[serde(rename = "😡")]
    Angry,
}

impl Mood {
    pub fn score(&self) -> u32 {
        match self {
            Mood::Loving => 100,
            Mood::Good => 80,
            Mood::Neutral => 60,
            Mood::Low => 40,
            Mood::Angry => 20,
        }
    }
}

/// At most one per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMood {
    pub id: String,
    pub date: NaiveDate,
    pub mood: Mood,
    pub timestamp: DateTime<Utc>,
}

/// A bookmarked coach reply. Unique by exact text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAdvice {
    pub id: String,
    pub text: String,
    pub date: DateTime<Utc>,
}
