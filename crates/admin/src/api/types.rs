//! Request and response payloads for the clinic backend.

use std::path::Path;

use clinic_admin_core::{
    Address, Appointment, DashboardSummary, Doctor, DoctorDashboard, Drug, Order,
};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ApiError;

/// Success/failure flag present on every response.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of every write endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct MessagePayload {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DoctorsPayload {
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppointmentsPayload {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DrugsPayload {
    pub drugs: Vec<Drug>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersPayload {
    pub orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardPayload {
    pub dash_data: DashboardSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DoctorDashboardPayload {
    pub dash_data: DoctorDashboard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfilePayload {
    pub profile_data: Doctor,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginPayload {
    pub token: String,
}

/// Email/password credentials for a role login.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginRequest {
    pub(crate) fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

/// Form data for `POST /api/admin/add-doctor` (sent as multipart with an image).
///
/// Implements `Debug` manually to redact the initial password.
#[derive(Clone)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub experience: String,
    pub fees: Decimal,
    pub about: String,
    pub speciality: String,
    pub degree: String,
    pub address: Address,
}

impl std::fmt::Debug for NewDoctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDoctor")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("speciality", &self.speciality)
            .finish_non_exhaustive()
    }
}

impl NewDoctor {
    /// Text parts of the multipart form. The address travels as a JSON string.
    pub(crate) fn form_fields(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        Ok(vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.expose_secret().to_string()),
            ("experience", self.experience.clone()),
            ("fees", self.fees.to_string()),
            ("about", self.about.clone()),
            ("speciality", self.speciality.clone()),
            ("degree", self.degree.clone()),
            ("address", serde_json::to_string(&self.address)?),
        ])
    }
}

/// An image attached to a multipart create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from in-memory bytes, guessing the MIME type from the
    /// file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name);
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read an upload from disk.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Io` if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Body of `POST /api/admin/update-order-status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderStatusBody<'a> {
    pub order_id: &'a str,
    pub status: clinic_admin_core::OrderStatus,
}
