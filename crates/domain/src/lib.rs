//! # terminal-domain
//!
//! Pure domain model for the container terminal storage backend.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **choices** (container size/state, transport type, billing units)
//! - Define **Companies** (customers) and their **Contracts**
//! - Define the **service catalog** (service types, services, contract prices)
//! - Define **Containers** and **Container visits** (one storage episode each)
//! - Contain all invariant enforcement: storage days, dispatch rules,
//!   service applicability and billing
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod billing;
pub mod catalog;
pub mod choices;
pub mod company;
pub mod container;
pub mod statistics;
pub mod visit;
