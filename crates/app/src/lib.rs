//! # terminal-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `CompanyRepository`: customer accounts
//!   - `ContainerRepository`: container rows, unique by name
//!   - `ContainerVisitRepository`: visits, applied services, attachments,
//!     filtered listing and statistics
//!   - `CatalogRepository`: service types, services, contracts and prices
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ContainerStorageService`: register, batch import, update, dispatch,
//!     list, attachments
//!   - `CompanyService`: create, get, list
//!   - `CatalogService`: catalog and contract management
//! - Describe list queries (`VisitFilter`) and pagination (`LimitOffset`)
//!   without knowing how they are executed
//!
//! ## Dependency rule
//! Depends on `terminal-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod commands;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
