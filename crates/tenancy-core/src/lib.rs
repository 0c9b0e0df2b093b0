//! Tenancy Core: entity models, repository traits and the shared error
//! type for the multi-tenant schema.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TenancyError, TenancyResult};
