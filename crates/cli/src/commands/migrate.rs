//! Database migration command.

use secrecy::SecretString;

use localmart_server::db;

/// Apply pending migrations from the server crate's embedded migrator.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let database_url = SecretString::from(std::env::var("DATABASE_URL")?);

    let pool = db::create_pool(&database_url).await?;
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("migrations applied");
    Ok(())
}
