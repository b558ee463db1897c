use serde::{Deserialize, Serialize};

use crate::models::profile::{AgeRange, Gender};
use crate::models::relationship::{Relationship, RelationshipPatch};

/// What the staged draft will turn into on commit. Adding and editing are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftMode {
    #[default]
    Idle,
    Adding,
    Editing(String),
}

/// Field values staged by the add/edit relationship wizard. Nothing here is
/// validated until commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipDraft {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub partner_name: String,
    pub partner_age: Option<AgeRange>,
    pub partner_gender: Option<Gender>,
    pub partner_notes: String,
    pub years: u32,
    pub months: u32,
    pub main_challenge: String,
}

impl RelationshipDraft {
    pub fn from_relationship(rel: &Relationship) -> Self {
        Self {
            kind: Some(rel.kind.as_str().to_string()),
            partner_name: rel.partner_name.clone(),
            partner_age: rel.partner_age,
            partner_gender: rel.partner_gender,
            partner_notes: rel.partner_notes.clone(),
            years: rel.years,
            months: rel.months,
            main_challenge: rel.main_challenge.clone(),
        }
    }

    /// Every field, as a full-replacement patch. A missing type becomes an
    /// empty one so the commit gate reports it.
    pub fn to_patch(&self) -> RelationshipPatch {
        RelationshipPatch {
            kind: Some(self.kind.clone().unwrap_or_default()),
            partner_name: Some(self.partner_name.clone()),
            partner_age: self.partner_age,
            partner_gender: self.partner_gender,
            partner_notes: Some(self.partner_notes.clone()),
            years: Some(self.years),
            months: Some(self.months),
            main_challenge: Some(self.main_challenge.clone()),
        }
    }
}

/// One wizard screen's worth of changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftUpdate {
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

impl DraftUpdate {
    pub fn apply_to(&self, draft: &mut RelationshipDraft) {
        if let Some(kind) = &self.kind {
            draft.kind = Some(kind.clone());
        }
        if let Some(name) = &self.partner_name {
            draft.partner_name = name.clone();
        }
        if self.partner_age.is_some() {
            draft.partner_age = self.partner_age;
        }
        if self.partner_gender.is_some() {
            draft.partner_gender = self.partner_gender;
        }
        if let Some(notes) = &self.partner_notes {
            draft.partner_notes = notes.clone();
        }
        if let Some(years) = self.years {
            draft.years = years;
        }
        if let Some(months) = self.months {
            draft.months = months;
        }
        if let Some(challenge) = &self.main_challenge {
            draft.main_challenge = challenge.clone();
        }
    }
}

/// Transient wizard state. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct DraftSession {
    pub mode: DraftMode,
    pub draft: RelationshipDraft,
    pub editing_profile: bool,
}

/// Wire shape of the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub adding: bool,
    pub editing_id: Option<String>,
    pub editing_profile: bool,
    pub draft: RelationshipDraft,
}

impl From<&DraftSession> for DraftView {
    fn from(session: &DraftSession) -> Self {
        let editing_id = match &session.mode {
            DraftMode::Editing(id) => Some(id.clone()),
            _ => None,
        };
        Self {
            adding: session.mode == DraftMode::Adding,
            editing_id,
            editing_profile: session.editing_profile,
            draft: session.draft.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut draft = RelationshipDraft {
            partner_name: "Ana".into(),
            years: 3,
            ..Default::default()
        };
        DraftUpdate {
            kind: Some("family".into()),
            months: Some(4),
            ..Default::default()
        }
        .apply_to(&mut draft);

        assert_eq!(draft.kind.as_deref(), Some("family"));
        assert_eq!(draft.partner_name, "Ana");
        assert_eq!(draft.years, 3);
        assert_eq!(draft.months, 4);
    }

    #[test]
    fn test_view_reports_editing_id() {
        let session = DraftSession {
            mode: DraftMode::Editing("r1".into()),
            ..Default::default()
        };
        let view = DraftView::from(&session);
        assert!(!view.adding);
        assert_eq!(view.editing_id.as_deref(), Some("r1"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["editingId"], "r1");
        assert!(json["draft"]["type"].is_null());
    }
}
