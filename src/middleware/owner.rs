//! Owner resolution middleware.
//!
//! Access keys belong to an owner: a user or session identified by the
//! surrounding application. This middleware:
//! 1. Reads the owner reference from the `X-Owner-Reference` header, or
//!    failing that from the `session_id` cookie
//! 2. Validates it
//! 3. Injects an `OwnerContext` into the request
//! 4. Rejects requests without an owner with HTTP 401

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

pub const OWNER_HEADER: &str = "x-owner-reference";
pub const SESSION_COOKIE: &str = "session_id";

const MAX_OWNER_LEN: usize = 255;

/// Owner context attached to requests that passed this middleware.
///
/// Route handlers extract it with `Extension<OwnerContext>`.
#[derive(Debug, Clone)]
pub struct OwnerContext {
    pub owner_reference: String,
}

/// Owner resolution middleware function.
///
/// # Returns
///
/// - `Ok(Response)` when an owner was resolved (calls next handler)
/// - `Err(AppError::MissingOwner)` when neither header nor cookie is present (401)
/// - `Err(AppError::InvalidOwner)` when the value is empty or too long (400)
pub async fn owner_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let raw = owner_from_headers(request.headers()).ok_or(AppError::MissingOwner)?;
    let owner_reference = validate_owner(&raw)?;

    request
        .extensions_mut()
        .insert(OwnerContext { owner_reference });

    Ok(next.run(request).await)
}

/// Find the raw owner reference, preferring the explicit header over the cookie.
fn owner_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(OWNER_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(value.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|cookies| cookie_value(cookies, SESSION_COOKIE))
}

/// Extract a cookie's value from a `Cookie` header (`a=1; b=2`).
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn validate_owner(raw: &str) -> Result<String, AppError> {
    let owner = raw.trim();

    if owner.is_empty() {
        return Err(AppError::InvalidOwner(
            "Owner reference must not be empty".to_string(),
        ));
    }

    if owner.len() > MAX_OWNER_LEN {
        return Err(AppError::InvalidOwner(format!(
            "Owner reference exceeds {MAX_OWNER_LEN} characters"
        )));
    }

    Ok(owner.to_string())
}
