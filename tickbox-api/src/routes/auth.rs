/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /register` - Register new user
/// - `POST /login` - Exchange email and password for a session token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tickbox_shared::{
    auth::credentials::{self, CredentialError},
    models::user::User,
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1))]
    pub username: String,

    /// Email address (unique)
    #[validate(length(min = 1))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1))]
    pub email: String,

    /// Password
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token for the `authorization` header
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "a@x.com",
///   "password": "pw"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "_id": "uuid",
///   "username": "alice",
///   "email": "a@x.com",
///   "createdAt": "2024-05-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, or `{"error": "Email already exists"}`
/// - `500 Internal Server Error`: `{"error": "Error registering user"}`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = credentials::register(state.store.as_ref(), &req.username, &req.email, &req.password)
        .await
        .map_err(|e| match e {
            CredentialError::DuplicateEmail => ApiError::BadRequest(e.to_string()),
            other => ApiError::internal("Error registering user", other),
        })?;

    Ok(Json(user))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "password": "pw"
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: `{"error": "Authentication failed"}` for an unknown
///   email or a wrong password alike
/// - `500 Internal Server Error`: `{"error": "Error logging in"}`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = credentials::authenticate(state.store.as_ref(), &req.email, &req.password)
        .await
        .map_err(|e| match e {
            CredentialError::AuthenticationFailed => ApiError::Unauthorized(e.to_string()),
            other => ApiError::internal("Error logging in", other),
        })?;

    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| ApiError::internal("Error logging in", e))?;

    Ok(Json(LoginResponse { token }))
}
