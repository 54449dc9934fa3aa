/// Request authentication for Axum
///
/// Reads the session token from the `authorization` header, verifies it with
/// a [`TokenIssuer`] and produces an [`AuthContext`] for the handler.
///
/// # Request states
///
/// ```text
/// no header / empty value        -> AuthError::MissingToken  (401 "Unauthorized")
/// header present, verify fails   -> AuthError::InvalidToken  (401 "Invalid token")
/// header present, verify passes  -> AuthContext { user_id } inserted, request proceeds
/// ```
///
/// The header carries the raw token. A leading `Bearer ` is stripped if a
/// client sends one.
///
/// # Example
///
/// ```
/// use tickbox_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{TokenError, TokenIssuer};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a verified user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token on the request
    #[error("Unauthorized")]
    MissingToken,

    /// Token failed verification
    #[error("Invalid token")]
    InvalidToken(#[source] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Extracts the raw token from request headers
///
/// Returns `None` when the header is absent, not valid UTF-8, or empty.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value.trim(),
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `AuthError::MissingToken` if there is no token
/// - `AuthError::InvalidToken` if the token does not verify
pub fn authenticate(headers: &HeaderMap, issuer: &TokenIssuer) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingToken)?;

    let user_id = issuer.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AuthError::InvalidToken(e)
    })?;

    Ok(AuthContext::new(user_id))
}

/// Pulls the `AuthContext` inserted by the authentication layer
///
/// Rejects with `401 Unauthorized` if the route was not behind the layer.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}
