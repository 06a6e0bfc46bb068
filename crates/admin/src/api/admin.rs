//! Administrator endpoints (`/api/admin/...`, `aToken` header).

use clinic_admin_core::{
    Appointment, AppointmentId, DashboardSummary, Doctor, DoctorId, Drug, DrugId, DrugUpdate,
    NewDrug, Order, OrderId, OrderStatus, Role,
};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tracing::instrument;

use super::client::BackendClient;
use super::types::{
    AppointmentsPayload, DashboardPayload, DoctorsPayload, DrugsPayload, ImageUpload,
    LoginPayload, LoginRequest, MessagePayload, NewDoctor, OrderStatusBody, OrdersPayload,
};
use super::ApiError;

const ROLE: Role = Role::Admin;

impl BackendClient {
    /// Exchange administrator credentials for an admin token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for wrong credentials, or a transport error.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn admin_login(&self, credentials: &LoginRequest) -> Result<String, ApiError> {
        let payload: LoginPayload = self
            .post_anonymous(ROLE, "login", &credentials.body())
            .await?;
        Ok(payload.token)
    }

    /// List every doctor.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn list_doctors(&self, token: &SecretString) -> Result<Vec<Doctor>, ApiError> {
        let payload: DoctorsPayload = self.get(ROLE, token, "all-doctors").await?;
        Ok(payload.doctors)
    }

    /// Flip a doctor's availability flag.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn change_availability(
        &self,
        token: &SecretString,
        doctor: &DoctorId,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post(ROLE, token, "change-availability", &json!({ "docId": doctor }))
            .await?;
        Ok(payload.message)
    }

    /// Register a new doctor with a profile image.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn add_doctor(
        &self,
        token: &SecretString,
        doctor: &NewDoctor,
        image: ImageUpload,
    ) -> Result<String, ApiError> {
        let fields = doctor.form_fields()?;
        let payload: MessagePayload = self
            .post_multipart(ROLE, token, "add-doctor", fields, image)
            .await?;
        Ok(payload.message)
    }

    /// List every appointment, in backend (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn list_appointments(
        &self,
        token: &SecretString,
    ) -> Result<Vec<Appointment>, ApiError> {
        let payload: AppointmentsPayload = self.get(ROLE, token, "appointments").await?;
        Ok(payload.appointments)
    }

    /// Cancel an appointment on the patient's behalf.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn admin_cancel_appointment(
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

    /// List the drug inventory.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn list_drugs(&self, token: &SecretString) -> Result<Vec<Drug>, ApiError> {
        let payload: DrugsPayload = self.get(ROLE, token, "all-drugs").await?;
        Ok(payload.drugs)
    }

    /// Create a drug with its image.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn add_drug(
        &self,
        token: &SecretString,
        drug: &NewDrug,
        image: ImageUpload,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post_multipart(ROLE, token, "add-drug", drug.form_fields(), image)
            .await?;
        Ok(payload.message)
    }

    /// Write a single drug field.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(drug = %drug))]
    pub async fn update_drug(
        &self,
        token: &SecretString,
        drug: &DrugId,
        update: &DrugUpdate,
    ) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post(ROLE, token, "update-drug", &update_drug_body(drug, update))
            .await?;
        Ok(payload.message)
    }

    /// Delete a drug.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn delete_drug(&self, token: &SecretString, drug: &DrugId) -> Result<String, ApiError> {
        let payload: MessagePayload = self
            .post(ROLE, token, "delete-drug", &json!({ "drugId": drug }))
            .await?;
        Ok(payload.message)
    }

    /// List every order, in backend (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn list_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let payload: OrdersPayload = self.get(ROLE, token, "all-orders").await?;
        Ok(payload.orders)
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn update_order_status(
        &self,
        token: &SecretString,
        order: &OrderId,
        status: OrderStatus,
    ) -> Result<String, ApiError> {
        let body = OrderStatusBody {
            order_id: order.as_str(),
            status,
        };
        let payload: MessagePayload = self
            .post(ROLE, token, "update-order-status", &body)
            .await?;
        Ok(payload.message)
    }

    /// Fetch the admin dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn dashboard(&self, token: &SecretString) -> Result<DashboardSummary, ApiError> {
        let payload: DashboardPayload = self.get(ROLE, token, "dashboard").await?;
        Ok(payload.dash_data)
    }
}

/// `{ drugId, <field>: value }`, with the in-stock toggle written as `stock`.
fn update_drug_body(drug: &DrugId, update: &DrugUpdate) -> Value {
    let (field, value) = update.body_entry();
    let mut body = Map::new();
    body.insert("drugId".to_string(), Value::String(drug.to_string()));
    body.insert(field.to_string(), value);
    Value::Object(body)
}
