//! Pharmacy orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::appointment::PatientSnapshot;
use super::id::{DrugId, OrderId};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Capitalised display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drug details snapshotted onto an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedDrug {
    #[serde(rename = "_id", default)]
    pub id: Option<DrugId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Decimal,
}

/// One line of an order.
///
/// The referenced drug may have been removed since, in which case the
/// backend returns `null` for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "drugId", default)]
    pub drug: Option<OrderedDrug>,
    pub quantity: u32,
}

impl OrderLine {
    /// Drug name for display.
    #[must_use]
    pub fn drug_name(&self) -> &str {
        self.drug.as_ref().map_or("Unknown Drug", |drug| drug.name.as_str())
    }
}

/// A pharmacy order placed by a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "userId", default)]
    pub buyer: Option<PatientSnapshot>,
    #[serde(default)]
    pub drugs: Vec<OrderLine>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Only pending orders can be completed or cancelled.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}
