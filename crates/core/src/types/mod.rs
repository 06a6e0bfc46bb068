//! Core types for the clinic admin client.
//!
//! These mirror the JSON records served by the clinic backend. Field names
//! follow the backend's camelCase wire format via serde renames.

pub mod appointment;
pub mod dashboard;
pub mod doctor;
pub mod drug;
pub mod id;
mod lenient;
pub mod order;
pub mod role;

pub use appointment::{Appointment, DoctorSnapshot, PatientSnapshot, format_slot_date};
pub use dashboard::{DashboardSummary, DoctorDashboard, LATEST_LIMIT};
pub use doctor::{Address, Doctor, ProfileField, ProfilePatch, ProfileUpdate};
pub use drug::{Drug, DrugCategory, DrugField, DrugUpdate, NewDrug, in_stock_patch};
pub use id::*;
pub use order::{Order, OrderLine, OrderStatus, OrderedDrug};
pub use role::{Role, RoleParseError};
