//! Domain models for the tenancy schema.
//!
//! Each entity has a stored shape (every column, as read back from
//! PostgreSQL) and an insert shape (required columns plus optional
//! overrides for columns that carry a database default).

pub mod session;
pub mod subscription;
pub mod tenant;
pub mod user;
