use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::DatabaseConfig;
use crate::migration::Migrator;

/// Opens the pool and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    tracing::info!("Initializing database connection pool...");

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(3))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    db.ping().await?;

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    tracing::info!("Database ready");

    Ok(db)
}
