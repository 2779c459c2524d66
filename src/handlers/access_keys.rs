//! Access key JSON API handlers.
//!
//! This module implements:
//! - POST /api/v1/access-key - Generate a key for the current owner
//! - GET /api/v1/access-key/status - Status of the current owner's key
//! - GET /api/v1/access-key/check - Whether the current owner has access
//! - POST /api/v1/access-key/verify - Verify a presented key (no owner needed)

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    app::AppState,
    error::AppError,
    middleware::owner::OwnerContext,
    models::access_key::{
        AccessCheckResponse, GeneratedKeyResponse, KeyStatusReport, VerifyKeyRequest,
        VerifyKeyResponse,
    },
};

/// Generate a new access key.
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "identifier": "ak_3f9a...",
///   "issued_at": "2024-01-01T00:00:00Z",
///   "expires_at": "2024-01-03T00:00:00Z"
/// }
/// ```
///
/// The identifier is only returned here. Any key the owner already held is
/// replaced.
pub async fn generate_key(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
) -> Result<impl IntoResponse, AppError> {
    let key = state.keys.generate_key(&owner.owner_reference).await?;

    Ok((StatusCode::CREATED, Json(GeneratedKeyResponse::from(key))))
}

/// Get the status of the current owner's key.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "active",
///   "issued_at": "2024-01-01T00:00:00Z",
///   "expires_at": "2024-01-03T00:00:00Z"
/// }
/// ```
pub async fn get_status(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
) -> Result<Json<KeyStatusReport>, AppError> {
    let report = state.keys.status_report(&owner.owner_reference).await?;

    Ok(Json(report))
}

/// Check whether the current owner may view gated content.
pub async fn check_access(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
) -> Result<Json<AccessCheckResponse>, AppError> {
    let has_access = state.keys.check_access(&owner.owner_reference).await?;

    Ok(Json(AccessCheckResponse { has_access }))
}

/// Verify an access key presented by a client.
///
/// # Request Body
///
/// ```json
/// { "identifier": "ak_3f9a..." }
/// ```
///
/// # Response (200 OK)
///
/// `{"valid": true, "owner_reference": "...", "expires_at": "..."}` for the
/// owner's current active key, otherwise `{"valid": false}`.
pub async fn verify_key(
    State(state): State<AppState>,
    Json(request): Json<VerifyKeyRequest>,
) -> Result<Json<VerifyKeyResponse>, AppError> {
    let identifier = request.identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::InvalidRequest(
            "identifier must not be empty".to_string(),
        ));
    }

    let verified = state.keys.verify_key(identifier).await?;

    Ok(Json(verified.into()))
}

#[cfg(test)]
mod tests {
    use crate::app::test_support::test_app;
    use crate::middleware::owner::OWNER_HEADER;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn owner_request(method: &str, uri: &str, owner: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(OWNER_HEADER, owner)
            .body(Body::empty())
            .unwrap()
    }

    fn verify_request(identifier: &str) -> Request<Body> {
        Request::post("/api/v1/access-key/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "identifier": identifier }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn status_is_none_before_generation() {
        let (app, _) = test_app();

        let (status, body) = send(
            &app,
            owner_request("GET", "/api/v1/access-key/status", "alice"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "none");
        assert!(body["expires_at"].is_null());
    }

    #[tokio::test]
    async fn generate_then_status_and_check() {
        let (app, _) = test_app();

        let (status, generated) =
            send(&app, owner_request("POST", "/api/v1/access-key", "alice")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(generated["identifier"].as_str().unwrap().starts_with("ak_"));

        let (_, report) = send(
            &app,
            owner_request("GET", "/api/v1/access-key/status", "alice"),
        )
        .await;
        assert_eq!(report["status"], "active");
        assert_eq!(report["expires_at"], generated["expires_at"]);

        let (_, check) = send(
            &app,
            owner_request("GET", "/api/v1/access-key/check", "alice"),
        )
        .await;
        assert_eq!(check, json!({ "has_access": true }));

        let (_, other) = send(
            &app,
            owner_request("GET", "/api/v1/access-key/check", "bob"),
        )
        .await;
        assert_eq!(other, json!({ "has_access": false }));
    }

    #[tokio::test]
    async fn owner_routes_reject_missing_owner() {
        let (app, _) = test_app();

        let (status, body) = send(
            &app,
            Request::get("/api/v1/access-key/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "missing_owner");
    }

    #[tokio::test]
    async fn verify_accepts_only_current_key() {
        let (app, keys) = test_app();
        let first = keys.generate_key("alice").await.unwrap();
        let second = keys.generate_key("alice").await.unwrap();

        let (status, body) = send(&app, verify_request(&second.identifier)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["owner_reference"], "alice");

        let (_, body) = send(&app, verify_request(&first.identifier)).await;
        assert_eq!(body, json!({ "valid": false }));
    }

    #[tokio::test]
    async fn verify_rejects_blank_identifier() {
        let (app, _) = test_app();

        let (status, body) = send(&app, verify_request("   ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }
}
