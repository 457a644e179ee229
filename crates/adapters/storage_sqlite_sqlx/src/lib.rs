//! # terminal-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `terminal-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `terminal-app` (for port traits) and `terminal-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod rows;

pub mod catalog_repo;
pub mod company_repo;
pub mod container_repo;
pub mod pool;
pub mod visit_repo;

pub use catalog_repo::SqliteCatalogRepository;
pub use company_repo::SqliteCompanyRepository;
pub use container_repo::SqliteContainerRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use visit_repo::SqliteContainerVisitRepository;
