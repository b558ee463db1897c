//! Where a returning user should land, and the add/edit relationship wizard.
//!
//! There is no persisted "onboarding complete" flag. The route is derived from
//! how much of the profile exists, so an interrupted onboarding resumes on its
//! own.

use serde::Serialize;
use tracing::info;

use crate::errors::{AppError, ValidationError};
use crate::models::profile::{Profile, ProfileUpdate};
use crate::models::relationship::Relationship;
use crate::relationships::validation::validate_draft;
use crate::state::AppState;

pub mod draft;
pub mod handlers;

use draft::{DraftMode, DraftUpdate, DraftView, RelationshipDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingRoute {
    /// Fresh start: legal and consent screen.
    Legal,
    /// Name captured, later steps incomplete.
    RelationshipType,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSnapshot {
    pub has_relationships: bool,
    pub has_user_name: bool,
    pub has_personal_info: bool,
}

impl OnboardingSnapshot {
    pub fn of(profile: &Profile, relationships: &[Relationship]) -> Self {
        Self {
            has_relationships: !relationships.is_empty(),
            has_user_name: profile.has_user_name(),
            has_personal_info: profile.has_personal_info(),
        }
    }
}

/// Relationships do not matter: a user who deleted all of them still lands on
/// `Main`.
pub fn resolve_route(snapshot: &OnboardingSnapshot) -> OnboardingRoute {
    match (snapshot.has_user_name, snapshot.has_personal_info) {
        (true, true) => OnboardingRoute::Main,
        (true, false) => OnboardingRoute::RelationshipType,
        _ => OnboardingRoute::Legal,
    }
}

/// Result of the last onboarding screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingOutcome {
    pub profile: Profile,
    pub relationship: Option<Relationship>,
    pub route: OnboardingRoute,
}

impl AppState {
    pub async fn onboarding_snapshot(&self) -> OnboardingSnapshot {
        let data = self.data.read().await;
        OnboardingSnapshot::of(&data.profile, &data.relationships)
    }

    pub async fn onboarding_route(&self) -> OnboardingRoute {
        resolve_route(&self.onboarding_snapshot().await)
    }

    pub fn draft(&self) -> DraftView {
        DraftView::from(&*self.draft_session())
    }

    /// Empty draft; the commit appends.
    pub fn begin_new_relationship(&self) -> DraftView {
        let mut session = self.draft_session();
        session.mode = DraftMode::Adding;
        session.draft = RelationshipDraft::default();
        session.editing_profile = false;
        DraftView::from(&*session)
    }

    /// Snapshots the relationship's fields; the commit merges them back by id.
    pub async fn begin_edit_relationship(&self, id: &str) -> Result<DraftView, AppError> {
        let rel = self
            .relationship(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Relationship {id} not found")))?;

        let mut session = self.draft_session();
        session.mode = DraftMode::Editing(rel.id.clone());
        session.draft = RelationshipDraft::from_relationship(&rel);
        session.editing_profile = false;
        Ok(DraftView::from(&*session))
    }

    /// The next `complete_onboarding` only saves the profile.
    pub fn begin_profile_edit(&self) -> DraftView {
        let mut session = self.draft_session();
        session.mode = DraftMode::Idle;
        session.editing_profile = true;
        DraftView::from(&*session)
    }

    pub fn update_draft(&self, update: &DraftUpdate) -> DraftView {
        let mut session = self.draft_session();
        update.apply_to(&mut session.draft);
        DraftView::from(&*session)
    }

    /// Turns the staged draft into an append or an update. The session is
    /// reset only when the commit succeeds.
    pub async fn commit_draft(&self) -> Result<Relationship, AppError> {
        let (mode, draft) = {
            let session = self.draft_session();
            (session.mode.clone(), session.draft.clone())
        };

        let relationship = match mode {
            DraftMode::Idle => return Err(ValidationError::NoDraft.into()),
            DraftMode::Adding => self.add_relationship(&draft).await?,
            DraftMode::Editing(id) => self.commit_edit(&id, &draft).await?,
        };

        self.reset_draft();
        Ok(relationship)
    }

    /// Saves the profile, then commits the staged relationship. The draft and
    /// the relationship being edited are checked before the profile is
    /// written, so a rejected completion writes nothing.
    pub async fn complete_onboarding(
        &self,
        update: &ProfileUpdate,
    ) -> Result<OnboardingOutcome, AppError> {
        let (mode, draft, editing_profile) = {
            let session = self.draft_session();
            (
                session.mode.clone(),
                session.draft.clone(),
                session.editing_profile,
            )
        };

        if editing_profile {
            let profile = self.save_profile(update).await?;
            self.draft_session().editing_profile = false;
            return Ok(OnboardingOutcome {
                profile,
                relationship: None,
                route: self.onboarding_route().await,
            });
        }

        validate_draft(&draft)?;
        if let DraftMode::Editing(id) = &mode {
            if self.relationship(id).await.is_none() {
                return Err(AppError::NotFound(format!("Relationship {id} not found")));
            }
        }
        let profile = self.save_profile(update).await?;
        let relationship = match mode {
            DraftMode::Editing(id) => self.commit_edit(&id, &draft).await?,
            DraftMode::Idle | DraftMode::Adding => self.add_relationship(&draft).await?,
        };
        self.reset_draft();

        let route = self.onboarding_route().await;
        info!("Onboarding completed, routing to {route:?}");
        Ok(OnboardingOutcome {
            profile,
            relationship: Some(relationship),
            route,
        })
    }

    async fn commit_edit(&self, id: &str, draft: &RelationshipDraft) -> Result<Relationship, AppError> {
        validate_draft(draft)?;
        self.update_relationship(id, &draft.to_patch()).await
    }

    fn reset_draft(&self) {
        let mut session = self.draft_session();
        session.mode = DraftMode::Idle;
        session.draft = RelationshipDraft::default();
    }
}
