//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.
//!
//! OAuth token exchange and session cookies live in an external auth proxy;
//! by the time a request reaches this service the proxy has already verified
//! the caller and injected their identity claims as `x-user-*` headers. The
//! pipeline trusts that injected identity.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// The identity claims supplied by the external OAuth collaborator.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Middleware that reads the proxy-injected identity headers.
///
/// If `x-user-id` is present, the claims are inserted into request
/// extensions for handlers to use. If missing or blank, returns
/// 401 Unauthorized.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let headers = req.headers();
    let user_id = header_value(headers, "x-user-id").ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = AuthClaims {
        email: header_value(headers, "x-user-email"),
        first_name: header_value(headers, "x-user-first-name"),
        last_name: header_value(headers, "x-user-last-name"),
        profile_image_url: header_value(headers, "x-user-profile-image"),
        user_id,
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn blank_headers_are_treated_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("   "));
        assert_eq!(header_value(&headers, "x-user-id"), None);
    }

    #[test]
    fn header_values_are_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-email", HeaderValue::from_static(" a@b.c "));
        assert_eq!(header_value(&headers, "x-user-email").as_deref(), Some("a@b.c"));
    }
}
