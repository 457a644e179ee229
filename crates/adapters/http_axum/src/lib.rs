//! # terminal-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON API** of the container terminal under `/api`
//!   (visit registration, batch import, update, dispatch, listings,
//!   attachments, statistics, customers and the service catalog)
//! - Check the shape of every request (presence, blank/null rules, lengths,
//!   choices) before calling the application services
//! - Shape responses: list and detail views of visits, per-customer items
//!   with billing totals, and `limit`/`offset` pagination envelopes
//! - Map [`TerminalError`](terminal_domain::error::TerminalError) into JSON
//!   error bodies with the matching status code
//!
//! ## Dependency rule
//! Depends on `terminal-app` (for port traits and services) and `terminal-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
