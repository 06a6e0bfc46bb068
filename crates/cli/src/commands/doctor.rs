//! Doctor panel commands: own profile, appointments and dashboard.

use clap::Subcommand;
use clinic_admin::AppState;
use clinic_admin_core::{AppointmentId, EditBuffer, ProfilePatch, Role};
use rust_decimal::Decimal;

use super::{ensure, require_token};
use crate::error::CliError;
use crate::output;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile
    Show,
    /// Change editable profile fields; unspecified fields keep their value
    Update {
        #[arg(long)]
        about: Option<String>,
        #[arg(long)]
        fees: Option<Decimal>,
        #[arg(long)]
        line1: Option<String>,
        #[arg(long)]
        line2: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum DoctorAction {
    /// List own appointments, newest first
    Appointments,
    /// Mark an appointment completed
    Complete { id: AppointmentId },
    /// Cancel an appointment
    Cancel { id: AppointmentId },
    /// Show earnings and latest bookings
    Dashboard,
}

pub async fn profile(state: &AppState, action: ProfileAction) -> Result<(), CliError> {
    require_token(state, Role::Doctor)?;
    let doctor = state.doctor();
    let currency = &state.config().currency;

    ensure(doctor.fetch_profile().await, "fetch profile")?;
    let snapshot = doctor.profile().snapshot();
    let Some(profile) = (*snapshot).as_ref() else {
        return Err(CliError::NotFound("doctor profile".to_string()));
    };

    match action {
        ProfileAction::Show => output::profile(profile, currency)?,
        ProfileAction::Update {
            about,
            fees,
            line1,
            line2,
            available,
        } => {
            let mut buffer = EditBuffer::new();
            buffer.begin(profile.id.clone());
            let staged = [
                about.map(ProfilePatch::About),
                fees.map(ProfilePatch::Fees),
                line1.map(ProfilePatch::AddressLine1),
                line2.map(ProfilePatch::AddressLine2),
                available.map(ProfilePatch::Available),
            ];
            for patch in staged.into_iter().flatten() {
                buffer.stage(profile.id.clone(), patch);
            }

            match doctor.save_profile_edits(&mut buffer).await {
                Some(outcome) => ensure(outcome, "update profile")?,
                None => output::line("Nothing to save")?,
            }
        }
    }
    Ok(())
}

pub async fn doctor(state: &AppState, action: DoctorAction) -> Result<(), CliError> {
    require_token(state, Role::Doctor)?;
    let doctor = state.doctor();
    let currency = &state.config().currency;

    match action {
        DoctorAction::Appointments => {
            ensure(doctor.fetch_appointments().await, "fetch appointments")?;
            output::appointments(&doctor.appointments().snapshot(), currency)?;
        }
        DoctorAction::Complete { id } => {
            ensure(doctor.complete_appointment(&id).await, "complete appointment")?;
        }
        DoctorAction::Cancel { id } => {
            ensure(doctor.cancel_appointment(&id).await, "cancel appointment")?;
        }
        DoctorAction::Dashboard => {
            ensure(doctor.fetch_dashboard().await, "fetch dashboard")?;
            let summary = doctor.dashboard().snapshot();
            output::doctor_dashboard((*summary).as_ref(), currency)?;
        }
    }
    Ok(())
}
