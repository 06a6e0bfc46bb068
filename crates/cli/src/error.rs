//! CLI error type.

use clinic_admin_core::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Admin(#[from] clinic_admin::Error),

    /// The command needs a token for this role and none is stored.
    #[error("Not signed in as {0}; run `clinic-cli login {0}` first")]
    NotSignedIn(Role),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The action ran and failed; the user has already been notified.
    #[error("{0} failed")]
    ActionFailed(&'static str),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<clinic_admin::api::ApiError> for CliError {
    fn from(e: clinic_admin::api::ApiError) -> Self {
        Self::Admin(e.into())
    }
}

impl From<clinic_admin::session::SessionError> for CliError {
    fn from(e: clinic_admin::session::SessionError) -> Self {
        Self::Admin(e.into())
    }
}
