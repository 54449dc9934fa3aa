/// Domain models for Tickbox
///
/// # Models
///
/// - `user`: Registered accounts
/// - `todo`: Per-user task records and partial updates
///
/// Persistence lives in the `store` module; the types here are plain data
/// shared by every backend.

pub mod todo;
pub mod user;
