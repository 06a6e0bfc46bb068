//! Terminal rendering of store snapshots and notifications.

use std::io::{self, Write};

use clinic_admin::notify::{Level, Notification};
use clinic_admin::view::{self, DrugRow};
use clinic_admin_core::{Appointment, DashboardSummary, Doctor, DoctorDashboard, Order};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::oneshot;

/// Print notifications to stdout as they are raised.
///
/// Runs until `done` fires (or its sender is dropped), then prints whatever
/// is still queued and returns.
pub async fn follow_notifications(
    mut rx: Receiver<Notification>,
    mut done: oneshot::Receiver<()>,
) -> io::Result<()> {
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(note) => write_notification(&mut io::stdout().lock(), &note)?,
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return Ok(()),
            },
            _ = &mut done => return drain_notifications(&mut rx, &mut io::stdout().lock()),
        }
    }
}

/// Write every notification already queued on `rx`, oldest first.
pub fn drain_notifications(
    rx: &mut Receiver<Notification>,
    out: &mut impl Write,
) -> io::Result<()> {
    loop {
        match rx.try_recv() {
            Ok(note) => write_notification(out, &note)?,
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn write_notification(out: &mut impl Write, note: &Notification) -> io::Result<()> {
    let tag = match note.level {
        Level::Success => "ok",
        Level::Error => "error",
    };
    writeln!(out, "[{tag}] {}", note.message)
}

pub fn line(text: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{text}")
}

pub fn doctors(list: &[Doctor], currency: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for doctor in list {
        writeln!(
            out,
            "{:<26} {:<24} {:<20} {:>8}  {}",
            doctor.id.as_str(),
            doctor.name,
            doctor.speciality,
            view::money(currency, doctor.fees),
            if doctor.available { "available" } else { "unavailable" },
        )?;
    }
    Ok(())
}

pub fn appointments(list: &[Appointment], currency: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for (index, appointment) in list.iter().enumerate() {
        let patient = appointment
            .user_data
            .as_ref()
            .map_or("-", |p| p.name.as_str());
        let doctor = appointment
            .doc_data
            .as_ref()
            .map_or("-", |d| d.name.as_str());
        writeln!(
            out,
            "{:>3}. {:<26} {:<20} {:<12} {:<9} {:<20} {:>8}  {}",
            index + 1,
            appointment.id.as_str(),
            patient,
            appointment.slot_date_label(),
            appointment.slot_time,
            doctor,
            view::money(currency, appointment.amount),
            view::appointment_status(appointment),
        )?;
    }
    Ok(())
}

pub fn drugs(rows: &[DrugRow], currency: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for row in rows {
        let drug = &row.drug;
        writeln!(
            out,
            "{:<26} {:<22} {:<14} {:<16} {:>8} {:>5}  {}{}",
            drug.id.as_str(),
            drug.name,
            drug.category.label(),
            drug.manufacturer,
            view::money(currency, drug.price),
            drug.stock,
            if row.in_stock { "in stock" } else { "out of stock" },
            if drug.prescription_required { ", Rx" } else { "" },
        )?;
    }
    Ok(())
}

pub fn orders(list: &[Order], currency: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for order in list {
        let buyer = order.buyer.as_ref().map_or("-", |b| b.name.as_str());
        let items = order
            .drugs
            .iter()
            .map(|line| format!("{} x{}", line.drug_name(), line.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "{:<26} {:<20} {:>9}  {:<10} {}{}",
            order.id.as_str(),
            buyer,
            view::money(currency, order.total_amount),
            order.status.label(),
            items,
            if order.is_actionable() { "  [actionable]" } else { "" },
        )?;
    }
    Ok(())
}

pub fn dashboard(summary: Option<&DashboardSummary>, currency: &str) -> io::Result<()> {
    let (counts, latest_appointments, latest_orders) = view::dashboard_cards(summary);
    {
        let mut out = io::stdout().lock();
        for (label, count) in counts {
            writeln!(out, "{label:<14} {count}")?;
        }
        writeln!(out)?;
        writeln!(out, "Latest Bookings")?;
    }
    appointments(latest_appointments, currency)?;
    line("")?;
    line("Latest Orders")?;
    orders(latest_orders, currency)
}

pub fn doctor_dashboard(summary: Option<&DoctorDashboard>, currency: &str) -> io::Result<()> {
    let Some(summary) = summary else {
        return line("No dashboard data");
    };
    {
        let mut out = io::stdout().lock();
        writeln!(out, "Earnings       {}", view::money(currency, summary.earnings))?;
        writeln!(out, "Appointments   {}", summary.appointments)?;
        writeln!(out, "Patients       {}", summary.patients)?;
        writeln!(out)?;
        writeln!(out, "Latest Bookings")?;
    }
    appointments(summary.recent_appointments(), currency)
}

pub fn profile(doctor: &Doctor, currency: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{} ({})", doctor.name, doctor.id)?;
    writeln!(out, "{} - {}", doctor.degree, doctor.speciality)?;
    writeln!(out, "Experience: {}", doctor.experience)?;
    writeln!(out, "About: {}", doctor.about)?;
    writeln!(out, "Fees: {}", view::money(currency, doctor.fees))?;
    writeln!(out, "Address: {}", doctor.address.line1)?;
    if !doctor.address.line2.is_empty() {
        writeln!(out, "         {}", doctor.address.line2)?;
    }
    writeln!(
        out,
        "Available: {}",
        if doctor.available { "yes" } else { "no" }
    )
}
