//! Tenancy Database: PostgreSQL schema, migrations and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - The declarative schema and its DDL ([`schema`], [`schema::tables`])
//! - Migrations ([`run_migrations`], [`write_migration_files`])
//! - `sqlx` implementations of the `tenancy-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod migration;
pub mod repository;
pub mod schema;
pub mod timestamp;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use migration::{applied_migrations, run_migrations, write_migration_files};
pub use sqlx::PgPool;
