//! Database migration command.

use crate::output;
use warmup_core::config::{AppConfig, DatabaseProvider};
use warmup_core::error::AppError;
use warmup_database::connection::DatabasePool;
use warmup_database::migration::run_migrations;

/// Apply every pending migration against the configured database
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != DatabaseProvider::Postgres {
        output::print_warning("database.provider is not postgres; nothing to migrate.");
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    let outcome = run_migrations(pool.pool()).await;
    pool.close().await;
    outcome?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
