//! # Authentication Middleware
//!
//! Bearer-token resolution for HTTP routes and chat sockets.
//!
//! A token is accepted from the `Authorization: Bearer <token>` header or,
//! for browser WebSockets that cannot set headers, a `?token=` query
//! parameter. A valid token must also name an account that exists in the
//! `users` table; the stored account (not the token) decides the role.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{Router, routing::get, middleware::from_fn_with_state};
//! use lib_web::middleware::require_auth;
//!
//! let app = Router::new()
//!     .route("/api/agent/dashboard", get(dashboard))
//!     .route_layer(from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Handlers then extract the caller with `Extension<Identity>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use lib_auth::{identity_from_token, Identity};
use lib_core::model::store::UserRepository;
use lib_core::{AppError, Config, DbPool};
use tracing::{debug, warn};

/// Pick the bearer token from the header, falling back to the query parameter.
pub fn bearer_token<'a>(headers: &'a HeaderMap, query_token: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .or(query_token)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decode `token` and load the account it names.
///
/// # Errors
///
/// [`AppError::Unauthorized`] for bad or expired tokens and unknown accounts.
pub async fn resolve_identity(db: &DbPool, config: &Config, token: &str) -> Result<Identity, AppError> {
    let claimed = identity_from_token(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user = UserRepository::find_by_id(db, claimed.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = claimed.user_id, "[AUTH] Token names unknown account");
            AppError::Unauthorized("Unknown account".to_string())
        })?;

    debug!("[AUTH] Authenticated user: {} (id: {}, role: {})", user.username, user.id, user.role);
    Ok(Identity::from(&user))
}

/// Authentication middleware for protected HTTP routes.
///
/// - **Valid token**: continues with the caller's [`Identity`] in the request extensions
/// - **Missing/invalid token**: `401 Unauthorized`
pub async fn require_auth(
    State(db): State<DbPool>,
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers(), None).ok_or_else(|| {
        warn!("[AUTH] Missing Authorization header");
        AppError::Unauthorized("Missing bearer token".to_string())
    })?;

    let identity = resolve_identity(&db, &config, token).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(bearer_token(&headers, Some("from-query")), Some("from-header"));
        assert_eq!(bearer_token(&HeaderMap::new(), Some("from-query")), Some("from-query"));
        assert_eq!(bearer_token(&HeaderMap::new(), Some("  ")), None);
        assert_eq!(bearer_token(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers, None), None);
    }
}
