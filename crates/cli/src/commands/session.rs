//! Sign-in, sign-out and token commands.

use clap::Subcommand;
use clinic_admin::AppState;
use clinic_admin::api::LoginRequest;
use clinic_admin::view::Layout;
use clinic_admin_core::Role;
use secrecy::SecretString;

use crate::error::CliError;
use crate::output;

#[derive(Subcommand)]
pub enum TokenAction {
    /// Store a token obtained elsewhere
    Set {
        role: Role,
        value: String,
    },
}

pub async fn login(
    state: &AppState,
    role: Role,
    email: String,
    password: String,
) -> Result<(), CliError> {
    let credentials = LoginRequest {
        email,
        password: SecretString::from(password),
    };
    state.login(role, &credentials).await?;
    output::line(&format!("Signed in as {role}"))?;
    Ok(())
}

pub async fn logout(state: &AppState, role: Role) -> Result<(), CliError> {
    state.logout(role).await?;
    output::line(&format!("Signed out of {role}"))?;
    Ok(())
}

pub async fn token(state: &AppState, action: TokenAction) -> Result<(), CliError> {
    match action {
        TokenAction::Set { role, value } => {
            state
                .session()
                .set_token(role, SecretString::from(value))
                .await?;
            tracing::info!(%role, "Token stored");
        }
    }
    Ok(())
}

pub fn status(state: &AppState) -> Result<(), CliError> {
    let session = state.session().snapshot();
    match Layout::for_session(&session) {
        Layout::Login => output::line("Not signed in")?,
        Layout::Authenticated => {
            for role in Role::ALL {
                let mark = if session.has_token(role) {
                    "signed in"
                } else {
                    "signed out"
                };
                output::line(&format!("{:<7} {mark}", role.to_string()))?;
            }
        }
    }
    Ok(())
}
