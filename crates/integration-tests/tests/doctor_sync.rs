//! Integration tests for the doctor panel: own profile, appointments and
//! dashboard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use clinic_admin::AppState;
use clinic_admin::sync::Outcome;
use clinic_admin_core::{AppointmentId, DoctorId, EditBuffer, ProfilePatch, Role};
use clinic_integration_tests::StubBackend;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tempfile::TempDir;

const TOKEN: &str = "doctor-token";

async fn setup() -> (StubBackend, AppState, TempDir) {
    let stub = StubBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let state = stub
        .signed_in(dir.path(), Role::Doctor, TOKEN)
        .await
        .unwrap();
    (stub, state, dir)
}

fn profile() -> Value {
    json!({
        "success": true,
        "profileData": {
            "_id": "doc1",
            "name": "Dr Grey",
            "speciality": "Dermatologist",
            "about": "Skin care",
            "fees": 50,
            "address": { "line1": "1 Main St", "line2": "Floor 2" },
            "available": true,
        }
    })
}

fn message(text: &str) -> Value {
    json!({ "success": true, "message": text })
}

#[tokio::test]
async fn test_doctor_token_sent_in_header() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/doctor/profile", profile());

    assert_eq!(state.doctor().fetch_profile().await, Outcome::Applied);

    let request = &stub.requests_to("/api/doctor/profile")[0];
    assert_eq!(request.doctor_token.as_deref(), Some(TOKEN));
    assert_eq!(request.admin_token, None);
    let snapshot = state.doctor().profile().snapshot();
    assert_eq!((*snapshot).as_ref().unwrap().name, "Dr Grey");
}

#[tokio::test]
async fn test_profile_save_is_single_call_with_effective_values() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/doctor/profile", profile());
    stub.respond("/api/doctor/update-profile", message("Profile Updated"));
    let doctor = state.doctor();
    assert_eq!(doctor.fetch_profile().await, Outcome::Applied);

    let id = DoctorId::new("doc1");
    let mut buffer = EditBuffer::new();
    buffer.begin(id.clone());
    buffer.stage(id.clone(), ProfilePatch::About("Skin and hair".to_string()));
    buffer.stage(id.clone(), ProfilePatch::Fees(Decimal::new(755, 1)));

    let outcome = doctor.save_profile_edits(&mut buffer).await;

    assert_eq!(outcome, Some(Outcome::Applied));
    assert!(!buffer.is_editing(&id));
    assert_eq!(stub.count("/api/doctor/update-profile"), 1);
    assert_eq!(stub.count("/api/doctor/profile"), 2);
    assert_eq!(
        stub.requests_to("/api/doctor/update-profile")[0].json,
        Some(json!({
            "address": { "line1": "1 Main St", "line2": "Floor 2" },
            "fees": 75.5,
            "about": "Skin and hair",
            "available": true,
        }))
    );
}

#[tokio::test]
async fn test_profile_save_without_edits_sends_nothing() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/doctor/profile", profile());
    let doctor = state.doctor();
    assert_eq!(doctor.fetch_profile().await, Outcome::Applied);

    let mut buffer = EditBuffer::<DoctorId, ProfilePatch>::new();
    buffer.begin(DoctorId::new("doc1"));

    assert_eq!(doctor.save_profile_edits(&mut buffer).await, None);
    assert_eq!(stub.count("/api/doctor/update-profile"), 0);
}

#[tokio::test]
async fn test_complete_refetches_appointments_and_dashboard() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/doctor/complete-appointment", message("Appointment Completed"));
    stub.respond(
        "/api/doctor/appointments",
        json!({
            "success": true,
            "appointments": [
                { "_id": "a1", "slotDate": "2_1_2025", "isCompleted": true },
                { "_id": "a2", "slotDate": "3_1_2025" },
            ]
        }),
    );
    stub.respond(
        "/api/doctor/dashboard",
        json!({
            "success": true,
            "dashData": { "earnings": 100, "appointments": 2, "patients": 1 }
        }),
    );
    let doctor = state.doctor();

    let outcome = doctor.complete_appointment(&AppointmentId::new("a1")).await;

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stub.count("/api/doctor/appointments"), 1);
    assert_eq!(stub.count("/api/doctor/dashboard"), 1);
    assert_eq!(
        stub.requests_to("/api/doctor/complete-appointment")[0].json,
        Some(json!({ "appointmentId": "a1" }))
    );

    let appointments = doctor.appointments().snapshot();
    assert_eq!(appointments[0].id.as_str(), "a2");
    assert!(appointments[1].is_completed);

    let dashboard = doctor.dashboard().snapshot();
    assert_eq!((*dashboard).as_ref().unwrap().earnings, Decimal::from(100));
}

#[tokio::test]
async fn test_rejected_cancel_skips_refetch() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/doctor/cancel-appointment",
        json!({ "success": false, "message": "Cancellation Failed" }),
    );
    let doctor = state.doctor();
    let mut rx = doctor.notifier().subscribe();

    let outcome = doctor.cancel_appointment(&AppointmentId::new("a1")).await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(stub.count("/api/doctor/appointments"), 0);
    assert_eq!(stub.count("/api/doctor/dashboard"), 0);
    assert_eq!(rx.try_recv().unwrap().message, "Cancellation Failed");
}
