//! Doctor endpoints (`/api/doctor/...`, `dToken` header).

use clinic_admin_core::{Appointment, AppointmentId, Doctor, DoctorDashboard, ProfileUpdate, Role};
use secrecy::SecretString;
use serde_json::json;
use tracing::instrument;

use super::ApiError;
use super::client::BackendClient;
use super::types::{
    AppointmentsPayload, DoctorDashboardPayload, LoginPayload, LoginRequest, MessagePayload,
    ProfilePayload,
};

const ROLE: Role = Role::Doctor;

impl BackendClient {
    /// Exchange doctor credentials for a doctor token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for wrong credentials, or a transport error.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn doctor_login(&self, credentials: &LoginRequest) -> Result<String, ApiError> {
        let payload: LoginPayload = self
            .post_anonymous(ROLE, "login", &credentials.body())
            .await?;
        Ok(payload.token)
    }

    /// Fetch the signed-in doctor's own profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn doctor_profile(&self, token: &SecretString) -> Result<Doctor, ApiError> {
        let payload: ProfilePayload = self.get(ROLE, token, "profile").await?;
        Ok(payload.profile_data)
    }

    /// Write the editable part of the doctor's profile in one call.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn update_doctor_profile(
        &self,
        token: &SecretString,
        update: &ProfileUpdate,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self.post(ROLE, token, "update-profile", update).await?;
        Ok(payload.message)
    }

    /// List the doctor's own appointments, in backend order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn doctor_appointments(
        &self,
        token: &SecretString,
    ) -> Result<Vec<Appointment>, ApiError> {
        let payload: AppointmentsPayload = self.get(ROLE, token, "appointments").await?;
        Ok(payload.appointments)
    }

    /// Mark one of the doctor's appointments completed.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn complete_appointment(
        &self,
        token: &SecretString,
        appointment: &AppointmentId,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post(
                ROLE,
                token,
                "complete-appointment",
                &json!({ "appointmentId": appointment }),
            )
            .await?;
        Ok(payload.message)
    }

    /// Cancel one of the doctor's appointments.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn doctor_cancel_appointment(
        &self,
        token: &SecretString,
        appointment: &AppointmentId,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post(
                ROLE,
                token,
                "cancel-appointment",
                &json!({ "appointmentId": appointment }),
            )
            .await?;
        Ok(payload.message)
    }

    /// Fetch the doctor dashboard.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn doctor_dashboard(&self, token: &SecretString) -> Result<DoctorDashboard, ApiError> {
        let payload: DoctorDashboardPayload = self.get(ROLE, token, "dashboard").await?;
        Ok(payload.dash_data)
    }
}
