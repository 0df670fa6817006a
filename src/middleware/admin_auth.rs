use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};

use crate::config::CONFIG;

/// Guards the moderation routes. When ADMIN_TOKEN is unset the routes stay
/// open (for development) and a warning is logged on every request.
pub async fn admin_auth_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    if CONFIG.admin_token.is_empty() {
        tracing::warn!("ADMIN_TOKEN is not set! Moderation API is unprotected.");
        return next.run(req).await;
    }

    // Authorization: Bearer <token>, or the X-Admin-Token header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let is_authorized = match auth_header {
        Some(header) => header.strip_prefix("Bearer ").unwrap_or(header) == CONFIG.admin_token,
        None => req
            .headers()
            .get("X-Admin-Token")
            .and_then(|h| h.to_str().ok())
            .map(|t| t == CONFIG.admin_token)
            .unwrap_or(false),
    };

    if is_authorized {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [("Content-Type", "application/json")],
            r#"{"success":false,"message":"unauthorized"}"#,
        )
            .into_response()
    }
}
