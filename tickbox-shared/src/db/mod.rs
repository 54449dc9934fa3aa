/// Database layer for Tickbox
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a connect-time health check
/// - `migrations`: Embedded schema migrations
///
/// Queries live in [`crate::store::postgres`].
///
/// # Example
///
/// ```no_run
/// use tickbox_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
