//! Subcommand implementations.
//!
//! Data commands check for the role's token before fetching anything,
//! and report a failed action through the exit status after the user has
//! seen the error notification.

pub mod admin;
pub mod doctor;
pub mod session;

use clinic_admin::AppState;
use clinic_admin::sync::Outcome;
use clinic_admin_core::Role;

use crate::error::CliError;

fn require_token(state: &AppState, role: Role) -> Result<(), CliError> {
    if state.session().snapshot().has_token(role) {
        Ok(())
    } else {
        Err(CliError::NotSignedIn(role))
    }
}

const fn ensure(outcome: Outcome, action: &'static str) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Failed => Err(CliError::ActionFailed(action)),
    }
}
