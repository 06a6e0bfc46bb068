//! Fetch and mutation-then-refresh actions.
//!
//! Every write follows the same rule: issue the write, notify the user of
//! the outcome and, only on success, re-fetch the affected store. Caches are
//! never updated optimistically. A failure leaves the cache untouched and is
//! terminal for that call; nothing is retried.

pub mod admin;
pub mod doctor;

pub use admin::AdminSync;
pub use doctor::DoctorSync;

use std::future::Future;

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::notify::Notifier;
use crate::store::ResourceStore;

/// Result of a fetch or mutation, after the user has been notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
}

impl Outcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Run a fetch and replace the store with its result.
///
/// On failure the previous cache is kept and an error notification raised.
pub(crate) async fn refresh<T, F>(
    store: &ResourceStore<T>,
    notifier: &Notifier,
    resource: &'static str,
    fetch: F,
) -> Outcome
where
    F: Future<Output = Result<T, ApiError>>,
{
    match fetch.await {
        Ok(value) => {
            store.replace(value);
            debug!(resource, "Cache replaced");
            Outcome::Applied
        }
        Err(e) => {
            warn!(resource, kind = ?e.kind(), error = %e, "Fetch failed");
            notifier.error(e.user_message());
            Outcome::Failed
        }
    }
}

/// Run a write and notify the user of its outcome.
///
/// The caller re-fetches when this returns [`Outcome::Applied`].
pub(crate) async fn mutate<F>(notifier: &Notifier, action: &'static str, write: F) -> Outcome
where
    F: Future<Output = Result<String, ApiError>>,
{
    match write.await {
        Ok(message) => {
            info!(action, "Mutation applied");
            notifier.success(message);
            Outcome::Applied
        }
        Err(e) => {
            warn!(action, kind = ?e.kind(), error = %e, "Mutation failed");
            notifier.error(e.user_message());
            Outcome::Failed
        }
    }
}
