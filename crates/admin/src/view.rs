//! View-model helpers.
//!
//! Everything here is derived from session, store and edit-buffer state;
//! nothing in this module holds state of its own.

use clinic_admin_core::{
    Appointment, DashboardSummary, Drug, DrugField, DrugId, DrugUpdate, EditBuffer, Order,
    in_stock_patch,
};
use rust_decimal::Decimal;

use crate::session::Session;

/// Which top-level layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Login,
    Authenticated,
}

impl Layout {
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        if session.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Login
        }
    }
}

/// A drug as displayed in the inventory list.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugRow {
    /// Canonical drug with staged edits written over it.
    pub drug: Drug,
    /// Effective in-stock flag.
    pub in_stock: bool,
    pub editing: bool,
}

/// Build the inventory list rows from the cached drugs and the edit buffer.
#[must_use]
pub fn drug_rows(drugs: &[Drug], buffer: &EditBuffer<DrugId, DrugUpdate>) -> Vec<DrugRow> {
    drugs
        .iter()
        .map(|canonical| {
            let drug = buffer.overlay(&canonical.id, canonical);
            let in_stock = match buffer.staged_field(&canonical.id, DrugField::InStock) {
                Some(DrugUpdate::InStock(quantity)) => *quantity > 0,
                _ => drug.in_stock(),
            };
            DrugRow {
                editing: buffer.is_editing(&canonical.id),
                drug,
                in_stock,
            }
        })
        .collect()
}

/// Stage the in-stock checkbox for a drug.
///
/// Checking it keeps the stock currently shown (staged or canonical), or
/// writes 1 if that is 0; unchecking writes 0.
pub fn stage_in_stock(buffer: &mut EditBuffer<DrugId, DrugUpdate>, drug: &Drug, checked: bool) {
    let shown = buffer.overlay(&drug.id, drug).stock;
    buffer.stage(drug.id.clone(), in_stock_patch(checked, shown));
}

/// Labelled dashboard counts, the five latest appointments and the five
/// latest orders.
#[must_use]
pub fn dashboard_cards(
    summary: Option<&DashboardSummary>,
) -> ([(&'static str, u64); 5], &[Appointment], &[Order]) {
    summary.map_or_else(
        || (DashboardSummary::default().counts(), &[][..], &[][..]),
        |s| (s.counts(), s.recent_appointments(), s.recent_orders()),
    )
}

/// Human status for an appointment row.
#[must_use]
pub const fn appointment_status(appointment: &Appointment) -> &'static str {
    if appointment.cancelled {
        "Cancelled"
    } else if appointment.is_completed {
        "Completed"
    } else {
        "Pending"
    }
}

/// Format an amount with the configured currency symbol.
#[must_use]
pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{currency}{}", amount.round_dp(2))
}
