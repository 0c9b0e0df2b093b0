//! Versioned migrations and the migration runner.
//!
//! Version 1 is generated from the declarative schema in
//! [`crate::schema::tables`]. Later versions must be appended, never
//! edited, once released.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::error::DbError;
use crate::schema::tables;
use crate::timestamp;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS \"_migration\" (
\t\"version\" integer PRIMARY KEY NOT NULL,
\t\"name\" text NOT NULL,
\t\"applied_at\" timestamp (3) with time zone DEFAULT NOW() NOT NULL
);";

/// A migration that has been applied to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i32,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    sql: fn() -> String,
}

impl Migration {
    pub fn sql(&self) -> String {
        (self.sql)()
    }

    /// File name used by [`write_migration_files`], e.g.
    /// `0001_initial_schema.sql`.
    pub fn file_name(&self) -> String {
        format!("{:04}_{}.sql", self.version, self.name)
    }
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: initial_schema,
}];

fn initial_schema() -> String {
    tables::schema().to_sql()
}

/// Every known migration, in ascending version order.
pub fn migrations() -> &'static [Migration] {
    MIGRATIONS
}

/// Run all pending migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum, each in
/// its own transaction together with its tracking row.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::raw_sql(MIGRATION_TABLE_DDL).execute(pool).await?;

    let current_version: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM \"_migration\"")
            .fetch_one(pool)
            .await?;

    for migration in migrations() {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let mut tx = pool.begin().await?;

        let sql = migration.sql();
        sqlx::raw_sql(&sql).execute(&mut *tx).await.map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        sqlx::query("INSERT INTO \"_migration\" (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        tx.commit().await?;

        info!(
            version = migration.version,
            "Migration applied successfully"
        );
    }

    Ok(())
}

/// List applied migrations, oldest first.
pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<AppliedMigration>, DbError> {
    let rows: Vec<(i32, String, String)> = sqlx::query_as(
        "SELECT version, name, applied_at::text FROM \"_migration\" ORDER BY version",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(version, name, applied_at)| {
            Ok(AppliedMigration {
                version,
                name,
                applied_at: timestamp::from_driver(&applied_at)?,
            })
        })
        .collect()
}

/// Write every migration as an SQL file into `dir`, creating it if
/// needed. Returns the written paths.
pub fn write_migration_files(dir: &Path) -> Result<Vec<PathBuf>, DbError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(migrations().len());
    for migration in migrations() {
        let path = dir.join(migration.file_name());
        std::fs::write(&path, migration.sql())?;
        info!(path = %path.display(), "Wrote migration file");
        written.push(path);
    }

    Ok(written)
}
