/// Registration and login against a [`UserStore`]
///
/// `register` hashes the password and stores a new user if the email is free.
/// `authenticate` checks an email/password pair and returns the matching user.
/// An unknown email and a wrong password produce the same
/// `CredentialError::AuthenticationFailed`.

use tracing::{debug, info};

use super::password::{hash_password_async, verify_password_async, PasswordError};
use crate::{
    models::user::{CreateUser, User},
    store::{StoreError, UserStore},
};

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A user with this email already exists
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failed
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => CredentialError::DuplicateEmail,
            other => CredentialError::Store(other),
        }
    }
}

/// Registers a new user
///
/// # Errors
///
/// - `CredentialError::DuplicateEmail` if the email is already registered
/// - `CredentialError::Password` / `CredentialError::Store` on internal failure
pub async fn register<S>(
    store: &S,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, CredentialError>
where
    S: UserStore + ?Sized,
{
    if store.find_user_by_email(email).await?.is_some() {
        debug!("Registration rejected: email already exists");
        return Err(CredentialError::DuplicateEmail);
    }

    let password_hash = hash_password_async(password.to_string()).await?;

    // The store re-checks uniqueness atomically
    let user = store
        .insert_user(CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Verifies an email/password pair
///
/// # Errors
///
/// - `CredentialError::AuthenticationFailed` for an unknown email or wrong password
/// - `CredentialError::Password` / `CredentialError::Store` on internal failure
pub async fn authenticate<S>(store: &S, email: &str, password: &str) -> Result<User, CredentialError>
where
    S: UserStore + ?Sized,
{
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(CredentialError::AuthenticationFailed)?;

    let valid = verify_password_async(password.to_string(), user.password_hash.clone()).await?;
    if !valid {
        debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(CredentialError::AuthenticationFailed);
    }

    info!(user_id = %user.id, "User authenticated");
    Ok(user)
}
