//! Access key page handlers.
//!
//! - GET /study_1 - Render the key generator page for the current owner
//! - POST /study_1 - Generate a key and hand the user over to the ad-view flow
//!
//! The page is intentionally plain: it shows the owner's key status, a form
//! with a single `generate_key` button, and a link back to the dashboard.

use axum::{
    Extension, Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    app::AppState,
    error::AppError,
    middleware::owner::OwnerContext,
    models::access_key::{KeyStatus, KeyStatusReport},
};

/// Form body posted by the page.
///
/// Only the presence of `generate_key` matters; the button sends it with an
/// empty value.
#[derive(Debug, Default, Deserialize)]
pub struct StudyForm {
    pub generate_key: Option<String>,
}

/// Render the key generator page.
pub async fn show_page(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
) -> Result<Html<String>, AppError> {
    let report = state.keys.status_report(&owner.owner_reference).await?;

    Ok(Html(render_page(&report, &state.config.dashboard_url)))
}

/// Handle the page's form submission.
///
/// With `generate_key` present a new key is generated (replacing any current
/// one) and the user is sent to the ad-view URL with `303 See Other`. The ad
/// flow returns them to the dashboard via `return_to`. Without it the user is
/// sent back to the page.
pub async fn submit_form(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Form(form): Form<StudyForm>,
) -> Result<Response, AppError> {
    if form.generate_key.is_none() {
        return Ok(Redirect::to("/study_1").into_response());
    }

    let ad_view_url = state
        .config
        .ad_view_url()
        .map_err(|e| AppError::Configuration(format!("invalid AD_REDIRECT_URL: {e}")))?;

    state.keys.generate_key(&owner.owner_reference).await?;

    Ok(Redirect::to(ad_view_url.as_str()).into_response())
}

fn status_banner(report: &KeyStatusReport) -> String {
    match (report.status, report.expires_at) {
        (KeyStatus::Active, Some(expires_at)) => format!(
            r#"<div class="status active">Active key - valid until {}</div>"#,
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        (KeyStatus::Expired, _) => {
            r#"<div class="status expired">Key expired - Generate new key</div>"#.to_string()
        }
        _ => r#"<div class="status none">No active key - Generate new key</div>"#.to_string(),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_page(report: &KeyStatusReport, dashboard_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generate Access Key - VIP Study</title>
</head>
<body>
    <div class="container">
        <h1>VIP Study - Access Key Generator</h1>
        <p class="subtitle">Generate your 48-hour access key to view study content</p>
        {banner}
        <div class="info">
            <p><strong>How it works:</strong></p>
            <p>1. Click the button below to generate your access key</p>
            <p>2. You'll be redirected to watch an ad</p>
            <p>3. After viewing, you'll get 48 hours of access to study content</p>
        </div>
        <form method="POST">
            <button type="submit" name="generate_key" class="generate-btn">Click here to generate key</button>
        </form>
        <a href="{dashboard}" class="back-link">Back to Study Dashboard</a>
        <p class="note"><strong>Note:</strong> Each key is valid for 48 hours. After expiration, you'll need to generate a new key.</p>
    </div>
</body>
</html>
"#,
        banner = status_banner(report),
        dashboard = escape_attr(dashboard_url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::test_support::{test_app, test_app_with_store};
    use crate::middleware::owner::OWNER_HEADER;
    use crate::store::test_support::FailingKeyStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    fn form_post(owner: &str, body: &'static str) -> Request<Body> {
        Request::post("/study_1")
            .header(OWNER_HEADER, owner)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn page_body(app: axum::Router, cookie: &str) -> String {
        let response = app
            .oneshot(
                Request::get("/study_1")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn page_shows_no_active_key_for_new_owner() {
        let (app, _) = test_app();

        let html = page_body(app, "session_id=sess-1").await;

        assert!(html.contains("No active key - Generate new key"));
        assert!(html.contains(r#"name="generate_key""#));
        assert!(html.contains(r#"href="/study""#));
    }

    #[tokio::test]
    async fn generate_redirects_to_ad_flow_and_activates_key() {
        let (app, keys) = test_app();

        let response = app
            .clone()
            .oneshot(form_post("sess-1", "generate_key="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://ads.example.com/watch?"));
        assert!(location.contains("return_to=%2Fstudy"));

        assert_eq!(keys.get_status("sess-1").await.unwrap(), KeyStatus::Active);

        let html = page_body(app, "session_id=sess-1").await;
        assert!(html.contains("Active key - valid until"));
    }

    #[tokio::test]
    async fn storage_failure_returns_500_without_redirect() {
        let (app, _) = test_app_with_store(Arc::new(FailingKeyStore));

        let response = app
            .oneshot(form_post("sess-1", "generate_key="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn submit_without_generate_key_changes_nothing() {
        let (app, keys) = test_app();

        let response = app.oneshot(form_post("sess-1", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/study_1");
        assert_eq!(keys.get_status("sess-1").await.unwrap(), KeyStatus::None);
    }

    #[tokio::test]
    async fn submit_without_owner_is_rejected() {
        let (app, keys) = test_app();

        let response = app
            .oneshot(
                Request::post("/study_1")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("generate_key="))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(keys.get_status("").await.unwrap(), KeyStatus::None);
    }

    #[test]
    fn expired_banner_prompts_regeneration() {
        let report = KeyStatusReport {
            status: KeyStatus::Expired,
            issued_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            expires_at: Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()),
        };

        assert!(status_banner(&report).contains("Key expired - Generate new key"));
    }

    #[test]
    fn dashboard_link_is_escaped() {
        let html = render_page(&KeyStatusReport::none(), r#"/study?a=1&b="x""#);
        assert!(html.contains(r#"href="/study?a=1&amp;b=&quot;x&quot;""#));
    }
}
