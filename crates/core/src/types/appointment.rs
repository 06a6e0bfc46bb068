//! Appointment records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{AppointmentId, DoctorId, PatientId};
use super::lenient::null_as_default;

/// Patient details denormalised onto an appointment or order at booking time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Doctor details denormalised onto an appointment at booking time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub fees: Decimal,
}

/// A booked appointment slot.
///
/// The client only ever flips `cancelled` (admin or doctor cancel) or
/// `is_completed` (doctor completes); both happen server-side followed by a
/// re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: AppointmentId,
    #[serde(default)]
    pub user_id: Option<PatientId>,
    #[serde(default)]
    pub doc_id: Option<DoctorId>,
    /// Backend slot date in `day_month_year` form, e.g. `20_1_2025`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slot_date: String,
    #[serde(default)]
    pub slot_time: String,
    #[serde(default)]
    pub user_data: Option<PatientSnapshot>,
    #[serde(default)]
    pub doc_data: Option<DoctorSnapshot>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub payment: bool,
    #[serde(default)]
    pub is_completed: bool,
}

impl Appointment {
    /// Whether the appointment can still be cancelled or completed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.cancelled && !self.is_completed
    }

    /// Display label for the slot date, falling back to the raw value.
    #[must_use]
    pub fn slot_date_label(&self) -> String {
        format_slot_date(&self.slot_date).unwrap_or_else(|| self.slot_date.clone())
    }
}

/// Format a `day_month_year` slot date as `20 Jan 2025`.
///
/// Returns `None` when the value is not a valid calendar date.
#[must_use]
pub fn format_slot_date(slot_date: &str) -> Option<String> {
    let mut parts = slot_date.split('_');
    let day = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let year = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%-d %b %Y").to_string())
}
