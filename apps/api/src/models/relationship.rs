use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::blank_as_none;
use super::profile::{AgeRange, Gender};

/// Kind of relationship the user is being coached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    Romantic,
    Family,
    ParentChild,
    Friend,
    Professional,
    Other,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 6] = [
        RelationshipType::Romantic,
        RelationshipType::Family,
        RelationshipType::ParentChild,
        RelationshipType::Friend,
        RelationshipType::Professional,
        RelationshipType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Romantic => "romantic",
            RelationshipType::Family => "family",
            RelationshipType::ParentChild => "parent_child",
            RelationshipType::Friend => "friend",
            RelationshipType::Professional => "professional",
            RelationshipType::Other => "diger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipType::Romantic => "Partner",
            RelationshipType::Family => "Family",
            RelationshipType::ParentChild => "Parent/Child",
            RelationshipType::Friend => "Friend",
            RelationshipType::Professional => "Colleague/Boss",
            RelationshipType::Other => "Other",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RelationshipType::Romantic => "💕",
            RelationshipType::Family => "👨‍👩‍👧‍👦",
            RelationshipType::ParentChild => "👶",
            RelationshipType::Friend => "🤝",
            RelationshipType::Professional => "💼",
            RelationshipType::Other => "✨",
        }
    }

    /// Strict parse: only recognised ids.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw.trim())
    }

    /// Lenient lookup for display; unknown ids fall back to `Other`.
    pub fn lookup(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(RelationshipType::Other)
    }
}

impl Serialize for RelationshipType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationshipType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RelationshipType::lookup(&raw))
    }
}

/// One relationship owned by the profile. Stored as an ordered list under
/// `relationships`; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub partner_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub partner_age: Option<AgeRange>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub partner_gender: Option<Gender>,
    #[serde(default)]
    pub partner_notes: String,
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    #[serde(default)]
    pub main_challenge: String,
    pub created_at: DateTime<Utc>,
    /// Unused; transcripts live under their own `chat_<id>` keys.
    #[serde(default)]
    pub chat_history: Vec<serde_json::Value>,
}

/// Partial update merged into an existing relationship by id.
///
/// `kind` stays a raw string so an empty or unknown value can be reported
/// as a validation failure rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub partner_name: Option<String>,
    pub partner_age: Option<AgeRange>,
    pub partner_gender: Option<Gender>,
    pub partner_notes: Option<String>,
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub main_challenge: Option<String>,
}
