//! Clinic Admin Core - Shared types library.
//!
//! This crate provides the types used across all clinic admin components:
//! - `admin` - Backend client, session store, resource stores and sync actions
//! - `cli` - Command-line front-end over the admin library
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no I/O, no
//! HTTP clients, no persistence. This keeps it lightweight and allows the
//! edit-buffer and patch rules to be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Ids, roles and the backend records (doctors, appointments,
//!   drugs, orders, dashboard summaries)
//! - [`edit`] - Per-entity local edit buffer used by inline list editing
//! - [`ordering`] - Presentation ordering applied when a collection is cached

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod edit;
pub mod ordering;
pub mod types;

pub use edit::{EditBuffer, FieldPatch, Overlay};
pub use ordering::CacheOrdering;
pub use types::*;
