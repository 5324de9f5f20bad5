//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL document store using Diesel ORM
//! - **cache**: Redis-backed post cache
//! - **security**: Argon2 password hashing and JWT identity tokens
//! - **connections**: process-wide connection lifecycle
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod connections;
pub mod persistence;
pub mod security;
