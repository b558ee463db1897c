use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Commit-time validation failures. One variant per field rule so the client
/// can attach the message to the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Partner name is required")]
    EmptyPartnerName,

    #[error("Relationship type is required")]
    MissingRelationshipType,

    #[error("Unknown relationship type '{0}'")]
    UnknownRelationshipType(String),

    #[error("Months must be between 0 and 11, got {0}")]
    MonthsOutOfRange(u32),

    #[error("User name is required")]
    EmptyUserName,

    #[error("Title is required")]
    EmptyTitle,

    #[error("Invalid date: day {day}, month {month}")]
    InvalidDate { day: u32, month: u32 },

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("No relationship draft is open")]
    NoDraft,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyPartnerName => "EMPTY_PARTNER_NAME",
            ValidationError::MissingRelationshipType => "MISSING_RELATIONSHIP_TYPE",
            ValidationError::UnknownRelationshipType(_) => "UNKNOWN_RELATIONSHIP_TYPE",
            ValidationError::MonthsOutOfRange(_) => "MONTHS_OUT_OF_RANGE",
            ValidationError::EmptyUserName => "EMPTY_USER_NAME",
            ValidationError::EmptyTitle => "EMPTY_TITLE",
            ValidationError::InvalidDate { .. } => "INVALID_DATE",
            ValidationError::EmptyMessage => "EMPTY_MESSAGE",
            ValidationError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            ValidationError::NoDraft => "NO_DRAFT",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Daily token quota exhausted")]
    DailyQuotaExceeded,

    #[error("Too many messages in the last minute")]
    RateLimited,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.code(), e.to_string()),
            AppError::DailyQuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "DAILY_QUOTA_EXCEEDED",
                "You've reached today's chat limit. Come back tomorrow and we'll keep talking."
                    .to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "You're sending messages very quickly. Take a breath and try again in a minute."
                    .to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_and_rate_limit_are_distinct() {
        let quota = AppError::DailyQuotaExceeded.into_response();
        let rate = AppError::RateLimited.into_response();
        assert_eq!(quota.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(rate.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let resp = AppError::from(ValidationError::EmptyPartnerName).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ValidationError::EmptyPartnerName.code(), "EMPTY_PARTNER_NAME");
    }
}
