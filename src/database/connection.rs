use clap::Subcommand;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::PoolConfig;
use crate::database::migrations::Migrator;

pub async fn establish_connection(
    database_url: &str,
    pool: &PoolConfig,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);

    // every connection to `sqlite::memory:` opens its own private database
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        pool.max_connections
    };

    opt.max_connections(max_connections)
        .min_connections(pool.min_connections.min(max_connections))
        .connect_timeout(pool.connect_timeout())
        .acquire_timeout(pool.connect_timeout())
        .idle_timeout(pool.idle_timeout())
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

/// Connect and bring the schema up to date.
pub async fn setup_database(
    database_url: &str,
    pool: &PoolConfig,
) -> Result<DatabaseConnection, DbErr> {
    let db = establish_connection(database_url, pool).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn migrate_database(
    db: &DatabaseConnection,
    direction: MigrateDirection,
) -> Result<(), DbErr> {
    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(db, None).await?;
            Migrator::up(db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://flowbuilder.db?mode=rwc".to_string(),
    }
}
