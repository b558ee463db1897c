//! Relationship CRUD.
//!
//! Every mutation follows the same two steps: compute the new list and swap
//! it into memory, then persist the whole serialized list.

use tracing::info;

use crate::errors::AppError;
use crate::models::new_id;
use crate::models::relationship::{Relationship, RelationshipPatch};
use crate::onboarding::draft::RelationshipDraft;
use crate::state::AppState;
use crate::store::{keys, remove_key, save_json};

pub mod handlers;
pub mod validation;

use validation::{validate_draft, validate_patch};

impl AppState {
    /// Insertion order.
    pub async fn relationships(&self) -> Vec<Relationship> {
        self.data.read().await.relationships.clone()
    }

    pub async fn relationships_recent_first(&self) -> Vec<Relationship> {
        let mut list = self.relationships().await;
        list.reverse();
        list
    }

    pub async fn relationship(&self, id: &str) -> Option<Relationship> {
        self.data
            .read()
            .await
            .relationships
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Appends a new relationship built from `draft` with a fresh id.
    pub async fn add_relationship(&self, draft: &RelationshipDraft) -> Result<Relationship, AppError> {
        let valid = validate_draft(draft)?;
        let relationship = Relationship {
            id: new_id(),
            kind: valid.kind,
            partner_name: valid.partner_name,
            partner_age: draft.partner_age,
            partner_gender: draft.partner_gender,
            partner_notes: draft.partner_notes.clone(),
            years: draft.years,
            months: draft.months,
            main_challenge: draft.main_challenge.clone(),
            created_at: self.now_utc(),
            chat_history: Vec::new(),
        };

        let list = {
            let mut data = self.data.write().await;
            data.relationships.push(relationship.clone());
            data.relationships.clone()
        };
        save_json(self.store.as_ref(), keys::RELATIONSHIPS, &list).await;

        info!("Added relationship {}", relationship.id);
        Ok(relationship)
    }

    /// Merges `patch` into the relationship with `id`.
    pub async fn update_relationship(
        &self,
        id: &str,
        patch: &RelationshipPatch,
    ) -> Result<Relationship, AppError> {
        let kind = validate_patch(patch)?;

        let (updated, list) = {
            let mut data = self.data.write().await;
            let rel = data
                .relationships
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Relationship {id} not found")))?;

            if let Some(kind) = kind {
                rel.kind = kind;
            }
            if let Some(name) = &patch.partner_name {
                rel.partner_name = name.trim().to_string();
            }
            if let Some(age) = patch.partner_age {
                rel.partner_age = Some(age);
            }
            if let Some(gender) = patch.partner_gender {
                rel.partner_gender = Some(gender);
            }
            if let Some(notes) = &patch.partner_notes {
                rel.partner_notes = notes.clone();
            }
            if let Some(years) = patch.years {
                rel.years = years;
            }
            if let Some(months) = patch.months {
                rel.months = months;
            }
            if let Some(challenge) = &patch.main_challenge {
                rel.main_challenge = challenge.clone();
            }

            let updated = rel.clone();
            (updated, data.relationships.clone())
        };
        save_json(self.store.as_ref(), keys::RELATIONSHIPS, &list).await;

        Ok(updated)
    }

    /// Removes the relationship, its chat transcript and any special dates
    /// pointing at it. Returns false when no such relationship exists.
    pub async fn delete_relationship(&self, id: &str) -> bool {
        let list = {
            let mut data = self.data.write().await;
            let before = data.relationships.len();
            data.relationships.retain(|r| r.id != id);
            if data.relationships.len() == before {
                return false;
            }
            data.relationships.clone()
        };
        save_json(self.store.as_ref(), keys::RELATIONSHIPS, &list).await;
        remove_key(self.store.as_ref(), &keys::chat(id)).await;

        let orphaned = self.special_dates_for(id).await;
        for date in &orphaned {
            self.delete_special_date(&date.id).await;
        }

        info!(
            "Deleted relationship {id} along with {} special date(s)",
            orphaned.len()
        );
        true
    }
}
