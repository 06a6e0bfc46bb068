//! Clinic Admin library.
//!
//! Client-side session and data synchronisation for the clinic/pharmacy
//! administration front-end:
//!
//! - [`session`] - Per-role tokens, persisted across restarts
//! - [`store`] - Cached copies of backend collections
//! - [`sync`] - Fetches and mutation-then-refresh actions for the admin and
//!   doctor contexts
//! - [`view`] - View-model helpers derived from the above
//! - [`api`] - Typed REST client for the clinic backend
//!
//! # Data flow
//!
//! Views call actions, actions call the backend, successful writes re-fetch
//! the affected store, and views re-render from store snapshots. Caches are
//! never updated optimistically.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod view;

pub use error::Error;
pub use state::AppState;
