/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed session token issuance and verification
/// - [`credentials`]: Registration and login against a user store
/// - [`middleware`]: Request authentication and the `AuthContext` extractor
///
/// # Example
///
/// ```no_run
/// use tickbox_shared::auth::{credentials, jwt::{TokenConfig, TokenIssuer}};
/// use tickbox_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let issuer = TokenIssuer::new(&TokenConfig::new("a-secret-key-that-is-at-least-32-bytes"));
///
/// credentials::register(&store, "alice", "a@x.com", "pw").await?;
/// let user = credentials::authenticate(&store, "a@x.com", "pw").await?;
/// let token = issuer.issue(user.id)?;
/// assert_eq!(issuer.verify(&token)?, user.id);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
