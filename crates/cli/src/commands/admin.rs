//! Admin panel commands: doctors, appointments, drugs, orders, dashboard.
//!
//! # Usage
//!
//! ```bash
//! clinic-cli doctors toggle 65f0a1
//! clinic-cli appointments cancel 65f0b7
//! clinic-cli drugs update 65f0c2 inStock false
//! clinic-cli drugs edit 65f0c2 --price 6.50 --stock 40
//! clinic-cli orders complete 65f0d1
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use clinic_admin::AppState;
use clinic_admin::api::{ImageUpload, NewDoctor};
use clinic_admin::view;
use clinic_admin_core::{
    Address, AppointmentId, DoctorId, Drug, DrugCategory, DrugId, DrugUpdate, EditBuffer,
    NewDrug, OrderId, OrderStatus, Role,
};
use rust_decimal::Decimal;
use secrecy::SecretString;

use super::{ensure, require_token};
use crate::error::CliError;
use crate::output;

#[derive(Subcommand)]
pub enum DoctorsAction {
    /// List every doctor
    List,
    /// Flip a doctor's availability
    Toggle { id: DoctorId },
    /// Register a new doctor
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Initial password for the doctor's account
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "1 Year")]
        experience: String,
        #[arg(long)]
        fees: Decimal,
        #[arg(long, default_value = "")]
        about: String,
        #[arg(long, default_value = "General physician")]
        speciality: String,
        #[arg(long)]
        degree: String,
        #[arg(long)]
        line1: String,
        #[arg(long, default_value = "")]
        line2: String,
        /// Profile picture
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AppointmentsAction {
    /// List appointments, newest first
    List,
    /// Cancel an appointment
    Cancel { id: AppointmentId },
}

#[derive(Subcommand)]
pub enum DrugsAction {
    /// List the inventory
    List,
    /// Add a drug
    Add {
        #[arg(long)]
        name: String,
        /// One of: Pain Relief, Allergy, Antibiotic, Antacid, Diabetes, Mental Health
        #[arg(long, default_value = "Pain Relief")]
        category: DrugCategory,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        price: Decimal,
        /// Defaults to 0
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        prescription_required: bool,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<NaiveDate>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Write a single field (`name`, `category`, `manufacturer`, `price`,
    /// `stock`, `prescriptionRequired`, `inStock`, `image`)
    Update {
        id: DrugId,
        field: String,
        value: String,
    },
    /// Delete a drug
    Delete { id: DrugId },
    /// Edit several fields at once; each changed field is saved separately
    Edit {
        id: DrugId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<DrugCategory>,
        #[arg(long)]
        manufacturer: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        prescription_required: Option<bool>,
        #[arg(long)]
        in_stock: Option<bool>,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List orders, newest first
    List,
    /// Mark a pending order completed
    Complete { id: OrderId },
    /// Cancel a pending order
    Cancel { id: OrderId },
}

pub async fn doctors(state: &AppState, action: DoctorsAction) -> Result<(), CliError> {
    require_token(state, Role::Admin)?;
    let admin = state.admin();

    match action {
        DoctorsAction::List => {
            ensure(admin.fetch_doctors().await, "fetch doctors")?;
            output::doctors(&admin.doctors().snapshot(), &state.config().currency)?;
        }
        DoctorsAction::Toggle { id } => {
            ensure(admin.change_availability(&id).await, "change availability")?;
        }
        DoctorsAction::Add {
            name,
            email,
            password,
            experience,
            fees,
            about,
            speciality,
            degree,
            line1,
            line2,
            image,
        } => {
            let doctor = NewDoctor {
                name,
                email,
                password: SecretString::from(password),
                experience,
                fees,
                about,
                speciality,
                degree,
                address: Address { line1, line2 },
            };
            let image = load_image(image.as_deref()).await?;
            ensure(admin.add_doctor(&doctor, image).await, "add doctor")?;
        }
    }
    Ok(())
}

pub async fn appointments(state: &AppState, action: AppointmentsAction) -> Result<(), CliError> {
    require_token(state, Role::Admin)?;
    let admin = state.admin();

    match action {
        AppointmentsAction::List => {
            ensure(admin.fetch_appointments().await, "fetch appointments")?;
            output::appointments(&admin.appointments().snapshot(), &state.config().currency)?;
        }
        AppointmentsAction::Cancel { id } => {
            ensure(admin.cancel_appointment(&id).await, "cancel appointment")?;
        }
    }
    Ok(())
}

pub async fn drugs(state: &AppState, action: DrugsAction) -> Result<(), CliError> {
    require_token(state, Role::Admin)?;
    let admin = state.admin();
    let currency = &state.config().currency;

    match action {
        DrugsAction::List => {
            ensure(admin.fetch_drugs().await, "fetch drugs")?;
            let rows = view::drug_rows(&admin.drugs().snapshot(), &EditBuffer::new());
            output::drugs(&rows, currency)?;
        }
        DrugsAction::Add {
            name,
            category,
            manufacturer,
            price,
            stock,
            description,
            prescription_required,
            expiry,
            image,
        } => {
            let drug = NewDrug {
                name,
                category,
                manufacturer,
                price,
                stock,
                description,
                prescription_required,
                expiry_date: expiry,
            };
            let image = load_image(image.as_deref()).await?;
            ensure(admin.add_drug(&drug, image).await, "add drug")?;
        }
        DrugsAction::Update { id, field, value } => {
            ensure(admin.fetch_drugs().await, "fetch drugs")?;
            let drugs = admin.drugs().snapshot();
            let update = parse_update(&field, &value, find_drug(&drugs, &id)?)?;
            ensure(admin.update_drug_field(&id, &update).await, "update drug")?;
        }
        DrugsAction::Delete { id } => {
            ensure(admin.delete_drug(&id).await, "delete drug")?;
        }
        DrugsAction::Edit {
            id,
            name,
            category,
            manufacturer,
            price,
            stock,
            prescription_required,
            in_stock,
            image,
        } => {
            ensure(admin.fetch_drugs().await, "fetch drugs")?;
            let drugs = admin.drugs().snapshot();
            let drug = find_drug(&drugs, &id)?;

            let mut buffer = EditBuffer::new();
            buffer.begin(id.clone());
            let staged = [
                image.map(DrugUpdate::Image),
                name.map(DrugUpdate::Name),
                category.map(DrugUpdate::Category),
                manufacturer.map(DrugUpdate::Manufacturer),
                price.map(DrugUpdate::Price),
                stock.map(DrugUpdate::Stock),
                prescription_required.map(DrugUpdate::PrescriptionRequired),
            ];
            for patch in staged.into_iter().flatten() {
                buffer.stage(id.clone(), patch);
            }
            if let Some(checked) = in_stock {
                view::stage_in_stock(&mut buffer, drug, checked);
            }

            output::line("Saving:")?;
            output::drugs(
                &view::drug_rows(std::slice::from_ref(drug), &buffer),
                currency,
            )?;

            let outcomes = admin.save_drug_edits(&mut buffer, &id).await;
            if outcomes.is_empty() {
                output::line("Nothing to save")?;
            } else if outcomes.iter().any(|outcome| !outcome.is_applied()) {
                return Err(CliError::ActionFailed("save drug edits"));
            }
        }
    }
    Ok(())
}

pub async fn orders(state: &AppState, action: OrdersAction) -> Result<(), CliError> {
    require_token(state, Role::Admin)?;
    let admin = state.admin();

    match action {
        OrdersAction::List => {
            ensure(admin.fetch_orders().await, "fetch orders")?;
            output::orders(&admin.orders().snapshot(), &state.config().currency)?;
        }
        OrdersAction::Complete { id } => {
            ensure(
                admin.update_order_status(&id, OrderStatus::Completed).await,
                "complete order",
            )?;
        }
        OrdersAction::Cancel { id } => {
            ensure(
                admin.update_order_status(&id, OrderStatus::Cancelled).await,
                "cancel order",
            )?;
        }
    }
    Ok(())
}

pub async fn dashboard(state: &AppState) -> Result<(), CliError> {
    require_token(state, Role::Admin)?;
    let admin = state.admin();

    ensure(admin.fetch_dashboard().await, "fetch dashboard")?;
    let summary = admin.dashboard().snapshot();
    output::dashboard((*summary).as_ref(), &state.config().currency)?;
    Ok(())
}

async fn load_image(path: Option<&std::path::Path>) -> Result<Option<ImageUpload>, CliError> {
    match path {
        Some(path) => Ok(Some(ImageUpload::from_path(path).await?)),
        None => Ok(None),
    }
}

fn find_drug<'a>(drugs: &'a [Drug], id: &DrugId) -> Result<&'a Drug, CliError> {
    drugs
        .iter()
        .find(|drug| &drug.id == id)
        .ok_or_else(|| CliError::NotFound(format!("drug {id}")))
}

/// Build a single-field edit from its request field name and a raw value.
fn parse_update(field: &str, value: &str, current: &Drug) -> Result<DrugUpdate, CliError> {
    let invalid = |e: &dyn std::fmt::Display| CliError::InvalidArgument(format!("{field}: {e}"));

    let update = match field {
        "image" => DrugUpdate::Image(value.to_owned()),
        "name" => DrugUpdate::Name(value.to_owned()),
        "category" => DrugUpdate::Category(value.parse().map_err(|e: String| invalid(&e))?),
        "manufacturer" => DrugUpdate::Manufacturer(value.to_owned()),
        "price" => DrugUpdate::Price(
            value
                .parse()
                .map_err(|e: rust_decimal::Error| invalid(&e))?,
        ),
        "stock" => DrugUpdate::Stock(
            value
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(&e))?,
        ),
        "prescriptionRequired" => DrugUpdate::PrescriptionRequired(
            value.parse().map_err(|e: std::str::ParseBoolError| invalid(&e))?,
        ),
        "inStock" => {
            let checked = value
                .parse()
                .map_err(|e: std::str::ParseBoolError| invalid(&e))?;
            clinic_admin_core::in_stock_patch(checked, current.stock)
        }
        other => {
            return Err(CliError::InvalidArgument(format!("unknown drug field: {other}")));
        }
    };
    Ok(update)
}
