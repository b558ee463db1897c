//! Commit-time rules for relationship fields.
//!
//! Checked when a create or update is committed, never per keystroke. A
//! failure leaves both memory and storage untouched.

use crate::errors::ValidationError;
use crate::models::relationship::{RelationshipPatch, RelationshipType};
use crate::onboarding::draft::RelationshipDraft;

pub const MAX_MONTHS: u32 = 11;

/// Returns the trimmed name.
pub fn validate_partner_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPartnerName);
    }
    Ok(trimmed.to_string())
}

pub fn validate_kind(raw: Option<&str>) -> Result<RelationshipType, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingRelationshipType);
    }
    RelationshipType::parse(raw).ok_or_else(|| ValidationError::UnknownRelationshipType(raw.into()))
}

pub fn validate_months(months: u32) -> Result<u32, ValidationError> {
    if months > MAX_MONTHS {
        return Err(ValidationError::MonthsOutOfRange(months));
    }
    Ok(months)
}

/// Fields of a draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub kind: RelationshipType,
    pub partner_name: String,
}

/// Partner name first, then type, then duration.
pub fn validate_draft(draft: &RelationshipDraft) -> Result<ValidatedDraft, ValidationError> {
    let partner_name = validate_partner_name(&draft.partner_name)?;
    let kind = validate_kind(draft.kind.as_deref())?;
    validate_months(draft.months)?;
    Ok(ValidatedDraft { kind, partner_name })
}

/// Only fields present in the patch are checked. Returns the parsed type when
/// the patch changes it.
pub fn validate_patch(patch: &RelationshipPatch) -> Result<Option<RelationshipType>, ValidationError> {
    if let Some(name) = &patch.partner_name {
        validate_partner_name(name)?;
    }
    let kind = match &patch.kind {
        Some(raw) => Some(validate_kind(Some(raw))?),
        None => None,
    };
    if let Some(months) = patch.months {
        validate_months(months)?;
    }
    Ok(kind)
}
