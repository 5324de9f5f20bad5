//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the domain's `DocumentStore` port on top of `diesel-async` with
//! `bb8` connection pooling.
//!
//! - **Thin adapter**: the store only translates between Diesel rows and
//!   domain types. Referential checks and cache coordination stay in the
//!   repository.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel failures are mapped to
//!   `DocumentStoreError` variants.
//!
//! # Example
//!
//! ```ignore
//! use social_backend::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
