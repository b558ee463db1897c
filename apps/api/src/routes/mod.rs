pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::SharedState;
use crate::{chat, onboarding, profile, relationships, tracking, usage};

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Onboarding
        .route(
            "/api/v1/onboarding/route",
            get(onboarding::handlers::handle_get_route),
        )
        .route(
            "/api/v1/onboarding/draft",
            get(onboarding::handlers::handle_get_draft)
                .patch(onboarding::handlers::handle_update_draft),
        )
        .route(
            "/api/v1/onboarding/draft/new",
            post(onboarding::handlers::handle_begin_new),
        )
        .route(
            "/api/v1/onboarding/draft/edit/:id",
            post(onboarding::handlers::handle_begin_edit),
        )
        .route(
            "/api/v1/onboarding/draft/profile",
            post(onboarding::handlers::handle_begin_profile_edit),
        )
        .route(
            "/api/v1/onboarding/draft/commit",
            post(onboarding::handlers::handle_commit_draft),
        )
        .route(
            "/api/v1/onboarding/complete",
            post(onboarding::handlers::handle_complete),
        )
        // Profile & settings
        .route("/api/v1/state", get(profile::handlers::handle_get_state))
        .route(
            "/api/v1/profile",
            get(profile::handlers::handle_get_profile).put(profile::handlers::handle_save_profile),
        )
        .route(
            "/api/v1/profile/logout",
            post(profile::handlers::handle_logout),
        )
        .route(
            "/api/v1/settings",
            get(profile::handlers::handle_get_settings)
                .put(profile::handlers::handle_update_settings),
        )
        // Relationships
        .route(
            "/api/v1/relationship-types",
            get(relationships::handlers::handle_list_types),
        )
        .route(
            "/api/v1/relationships",
            get(relationships::handlers::handle_list_relationships)
                .post(relationships::handlers::handle_add_relationship),
        )
        .route(
            "/api/v1/relationships/:id",
            patch(relationships::handlers::handle_update_relationship)
                .delete(relationships::handlers::handle_delete_relationship),
        )
        // Tracking
        .route(
            "/api/v1/special-dates",
            get(tracking::handlers::handle_list_special_dates)
                .post(tracking::handlers::handle_add_special_date),
        )
        .route(
            "/api/v1/special-dates/:id",
            delete(tracking::handlers::handle_delete_special_date),
        )
        .route(
            "/api/v1/moods",
            get(tracking::handlers::handle_list_moods).post(tracking::handlers::handle_add_mood),
        )
        .route(
            "/api/v1/moods/summary",
            get(tracking::handlers::handle_mood_summary),
        )
        .route(
            "/api/v1/advice",
            get(tracking::handlers::handle_list_advice)
                .post(tracking::handlers::handle_save_advice),
        )
        .route(
            "/api/v1/advice/:id",
            delete(tracking::handlers::handle_remove_advice),
        )
        // Usage & chat
        .route("/api/v1/usage", get(usage::handlers::handle_get_usage))
        .route(
            "/api/v1/chat/:conversation",
            get(chat::handlers::handle_get_transcript)
                .delete(chat::handlers::handle_clear_transcript),
        )
        .route(
            "/api/v1/chat/:conversation/messages",
            post(chat::handlers::handle_send_message),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::state::testing::harness;

    async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = call(build_router(h.state.clone()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_onboarding_flow_over_http() {
        let h = harness();
        let router = build_router(h.state.clone());

        let (_, body) = call(router.clone(), "GET", "/api/v1/onboarding/route", None).await;
        assert_eq!(body["route"], "legal");

        let (status, _) = call(
            router.clone(),
            "PATCH",
            "/api/v1/onboarding/draft",
            Some(json!({ "type": "romantic", "partnerName": "Ana", "years": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            router.clone(),
            "POST",
            "/api/v1/onboarding/complete",
            Some(json!({
                "userName": "Deniz",
                "userAge": "25-34",
                "userGender": "female",
                "relationshipStatus": "relationship",
                "coachingGoal": "understand"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], "main");
        assert_eq!(body["relationship"]["partnerName"], "Ana");

        let (_, body) = call(router, "GET", "/api/v1/relationships", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let h = harness();
        let (status, body) = call(
            build_router(h.state.clone()),
            "POST",
            "/api/v1/relationships",
            Some(json!({ "type": "friend", "partnerName": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_PARTNER_NAME");
    }

    #[tokio::test]
    async fn test_rate_limit_over_http() {
        let h = harness();
        let router = build_router(h.state.clone());
        for _ in 0..10 {
            let (status, _) = call(
                router.clone(),
                "POST",
                "/api/v1/chat/general/messages",
                Some(json!({ "text": "hi" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = call(
            router.clone(),
            "POST",
            "/api/v1/chat/general/messages",
            Some(json!({ "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");

        let (_, usage) = call(router, "GET", "/api/v1/usage", None).await;
        assert_eq!(usage["messagesInWindow"], 10);
    }

    #[tokio::test]
    async fn test_relationship_types_catalogue() {
        let h = harness();
        let (_, body) = call(build_router(h.state.clone()), "GET", "/api/v1/relationship-types", None).await;
        let types = body.as_array().unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[5]["id"], "diger");
        assert_eq!(types[0]["label"], "Partner");
    }

    #[tokio::test]
    async fn test_unknown_special_date_delete_is_404() {
        let h = harness();
        let (status, body) = call(
            build_router(h.state.clone()),
            "DELETE",
            "/api/v1/special-dates/nope",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
