//! Dashboard summaries.
//!
//! Both summaries are regenerated wholesale by the backend on every fetch
//! and are never merged client-side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::order::Order;

/// Number of recent items a dashboard shows.
pub const LATEST_LIMIT: usize = 5;

/// Admin dashboard: aggregate counts plus the latest bookings and orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub doctors: Option<u64>,
    #[serde(default)]
    pub appointments: Option<u64>,
    #[serde(default)]
    pub patients: Option<u64>,
    #[serde(default)]
    pub drugs: Option<u64>,
    #[serde(default)]
    pub orders: Option<u64>,
    #[serde(default)]
    pub latest_appointments: Vec<Appointment>,
    #[serde(default)]
    pub latest_orders: Vec<Order>,
}

impl DashboardSummary {
    /// Labelled counts for the summary cards; missing counts display as 0.
    #[must_use]
    pub fn counts(&self) -> [(&'static str, u64); 5] {
        [
            ("Doctors", self.doctors.unwrap_or(0)),
            ("Appointments", self.appointments.unwrap_or(0)),
            ("Patients", self.patients.unwrap_or(0)),
            ("Drugs", self.drugs.unwrap_or(0)),
            ("Orders", self.orders.unwrap_or(0)),
        ]
    }

    /// The latest bookings shown on the dashboard.
    #[must_use]
    pub fn recent_appointments(&self) -> &[Appointment] {
        truncate(&self.latest_appointments)
    }

    /// The latest orders shown on the dashboard.
    #[must_use]
    pub fn recent_orders(&self) -> &[Order] {
        truncate(&self.latest_orders)
    }
}

/// Doctor dashboard: earnings and counts for the signed-in doctor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    #[serde(default)]
    pub earnings: Decimal,
    #[serde(default)]
    pub appointments: u64,
    #[serde(default)]
    pub patients: u64,
    #[serde(default)]
    pub latest_appointments: Vec<Appointment>,
}

impl DoctorDashboard {
    /// The latest bookings shown on the dashboard.
    #[must_use]
    pub fn recent_appointments(&self) -> &[Appointment] {
        truncate(&self.latest_appointments)
    }
}

fn truncate<T>(items: &[T]) -> &[T] {
    items.get(..LATEST_LIMIT).unwrap_or(items)
}
