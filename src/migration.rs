//! Embedded, versioned schema migrations.
//!
//! Migrations are compiled in from `migrations/` and tracked by sqlx in the
//! `_sqlx_migrations` table.

use sqlx::migrate::Migrator;

use crate::{dao::PoolType, error::Error};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration in version order. Each migration runs in
/// its own transaction.
pub async fn run_migrations(pool: &PoolType) -> Result<(), Error> {
    tracing::info!("Running database migrations...");

    add_missing_time_column(pool).await?;

    let before = applied_versions(pool).await?;
    MIGRATOR.run(pool).await?;
    let after = applied_versions(pool).await?;

    let applied: Vec<&(i64, String)> =
        after.iter().filter(|item| !before.contains(item)).collect();

    if applied.is_empty() {
        tracing::info!("No new migrations to apply");
    } else {
        for (version, description) in &applied {
            tracing::info!("Applied migration: {:04}_{}", version, description);
        }
        tracing::info!("Successfully applied {} migration(s)", applied.len());
    }

    Ok(())
}

/// Databases created before events had a time of day lack the `time`
/// column, while newer unmanaged databases already have it. The column is
/// added only where it is missing, ahead of the versioned migrations.
async fn add_missing_time_column(pool: &PoolType) -> Result<(), Error> {
    let (tables,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM sqlite_master
        WHERE type = 'table' AND name = 'events'
        "#,
    )
    .fetch_one(pool)
    .await?;

    if tables == 0 {
        return Ok(());
    }

    let (columns,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM pragma_table_info('events') WHERE name = 'time'
        "#,
    )
    .fetch_one(pool)
    .await?;

    if columns > 0 {
        return Ok(());
    }

    sqlx::query("ALTER TABLE events ADD COLUMN time TEXT")
        .execute(pool)
        .await?;
    tracing::info!("Added 'time' column to 'events' table");

    Ok(())
}

/// Versions recorded as successfully applied, oldest first. Empty on a
/// database that was never migrated.
pub async fn applied_versions(
    pool: &PoolType,
) -> Result<Vec<(i64, String)>, Error> {
    let (exists,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM sqlite_master
        WHERE type = 'table' AND name = '_sqlx_migrations'
        "#,
    )
    .fetch_one(pool)
    .await?;

    if exists == 0 {
        return Ok(vec![]);
    }

    let data = sqlx::query_as(
        r#"
        SELECT version, description FROM _sqlx_migrations
        WHERE success = 1
        ORDER BY version
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(data)
}

/// Embedded migrations that are not yet applied.
pub async fn pending_versions(
    pool: &PoolType,
) -> Result<Vec<(i64, String)>, Error> {
    let applied = applied_versions(pool).await?;

    let pending = MIGRATOR
        .iter()
        .filter(|m| !applied.iter().any(|(version, _)| *version == m.version))
        .map(|m| (m.version, m.description.to_string()))
        .collect();

    Ok(pending)
}
