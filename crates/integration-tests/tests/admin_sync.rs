//! Integration tests for the administrator stores and actions.
//!
//! Each test runs the real client against the stub backend and checks both
//! the calls that reached the backend and the resulting cache state.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::StatusCode;
use clinic_admin::AppState;
use clinic_admin::api::{BackendClient, ImageUpload};
use clinic_admin::config::ClientConfig;
use clinic_admin::notify::{Level, Notification};
use clinic_admin::session::{SessionStore, TokenStorage};
use clinic_admin::sync::Outcome;
use clinic_admin::view;
use clinic_admin_core::{
    DoctorId, DrugCategory, DrugId, DrugUpdate, EditBuffer, NewDrug, OrderId, OrderStatus, Role,
};
use clinic_integration_tests::{StubBackend, closed_port_url};
use secrecy::SecretString;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::broadcast::Receiver;

const TOKEN: &str = "admin-token";

async fn setup() -> (StubBackend, AppState, TempDir) {
    let stub = StubBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let state = stub.signed_in(dir.path(), Role::Admin, TOKEN).await.unwrap();
    (stub, state, dir)
}

fn ok(key: &str, value: Value) -> Value {
    let mut body = json!({ "success": true });
    body[key] = value;
    body
}

fn message(text: &str) -> Value {
    json!({ "success": true, "message": text })
}

fn order(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "userId": { "name": "Ann Patient" },
        "drugs": [{ "drugId": { "_id": "x1", "name": "Ibuprofen" }, "quantity": 2 }],
        "totalAmount": 9.98,
        "status": status,
    })
}

fn appointment(id: &str) -> Value {
    json!({ "_id": id, "slotDate": "12_3_2025", "slotTime": "10:30 AM", "amount": 50 })
}

fn drug(id: &str, stock: u32) -> Value {
    json!({ "_id": id, "name": "Ibuprofen", "category": "Pain Relief", "price": 5, "stock": stock })
}

fn next_note(rx: &mut Receiver<Notification>) -> Notification {
    rx.try_recv().unwrap()
}

fn new_drug() -> NewDrug {
    NewDrug {
        name: "Cetirizine".to_string(),
        category: DrugCategory::Allergy,
        manufacturer: "Acme".to_string(),
        price: Decimal::new(350, 2),
        stock: None,
        description: "Antihistamine".to_string(),
        prescription_required: false,
        expiry_date: None,
    }
}

// =============================================================================
// Fetches
// =============================================================================

#[tokio::test]
async fn test_admin_token_sent_in_header() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-doctors", ok("doctors", json!([])));

    assert_eq!(state.admin().fetch_doctors().await, Outcome::Applied);

    let request = &stub.requests_to("/api/admin/all-doctors")[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.admin_token.as_deref(), Some(TOKEN));
    assert_eq!(request.doctor_token, None);
}

#[tokio::test]
async fn test_appointments_and_orders_cached_newest_first() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/appointments",
        ok(
            "appointments",
            json!([appointment("a1"), appointment("a2"), appointment("a3")]),
        ),
    );
    stub.respond(
        "/api/admin/all-orders",
        ok(
            "orders",
            json!([order("o1", "pending"), order("o2", "completed")]),
        ),
    );

    let admin = state.admin();
    assert_eq!(admin.fetch_appointments().await, Outcome::Applied);
    assert_eq!(admin.fetch_orders().await, Outcome::Applied);

    let appointments = admin.appointments().snapshot();
    let ids: Vec<&str> = appointments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a3", "a2", "a1"]);

    let orders = admin.orders().snapshot();
    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o2", "o1"]);
}

#[tokio::test]
async fn test_failed_fetch_leaves_cache_unchanged() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x1", 4)])));
    stub.respond(
        "/api/admin/all-drugs",
        json!({ "success": false, "message": "jwt expired" }),
    );
    let admin = state.admin();
    let mut rx = admin.notifier().subscribe();

    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);
    assert_eq!(admin.fetch_drugs().await, Outcome::Failed);

    let drugs = admin.drugs().snapshot();
    assert_eq!(drugs.len(), 1);
    assert_eq!(drugs[0].stock, 4);
    assert_eq!(
        next_note(&mut rx),
        Notification {
            level: Level::Error,
            message: "jwt expired".to_string(),
        }
    );
}

#[tokio::test]
async fn test_dashboard_is_replaced_whole() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/dashboard",
        ok(
            "dashData",
            json!({ "doctors": 3, "orders": 9, "latestOrders": [order("o1", "pending")] }),
        ),
    );
    stub.respond("/api/admin/dashboard", ok("dashData", json!({ "doctors": 4 })));
    let admin = state.admin();

    assert!(admin.dashboard().snapshot().is_none());

    assert_eq!(admin.fetch_dashboard().await, Outcome::Applied);
    let first = admin.dashboard().snapshot();
    let first = (*first).as_ref().unwrap();
    assert_eq!(first.orders, Some(9));
    assert_eq!(first.latest_orders.len(), 1);

    assert_eq!(admin.fetch_dashboard().await, Outcome::Applied);
    let second = admin.dashboard().snapshot();
    let second = (*second).as_ref().unwrap();
    assert_eq!(second.doctors, Some(4));
    assert_eq!(second.orders, None);
    assert!(second.latest_orders.is_empty());
}

#[tokio::test]
async fn test_fetch_all_fills_every_store() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/all-doctors",
        ok("doctors", json!([{ "_id": "d1", "name": "Dr Who" }])),
    );
    stub.respond(
        "/api/admin/appointments",
        ok("appointments", json!([appointment("a1")])),
    );
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x1", 1)])));
    stub.respond("/api/admin/all-orders", ok("orders", json!([order("o1", "pending")])));
    stub.respond("/api/admin/dashboard", ok("dashData", json!({ "patients": 7 })));

    let admin = state.admin();
    let outcomes = admin.fetch_all().await;

    assert!(outcomes.iter().all(|o| o.is_applied()));
    assert_eq!(admin.doctors().snapshot().len(), 1);
    assert_eq!(admin.appointments().snapshot().len(), 1);
    assert_eq!(admin.drugs().snapshot().len(), 1);
    assert_eq!(admin.orders().snapshot().len(), 1);
    assert!(admin.dashboard().snapshot().is_some());
}

#[tokio::test]
async fn test_drug_list_with_odd_records_still_applies() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/all-drugs",
        ok(
            "drugs",
            json!([
                { "_id": "x1", "name": "Multivitamin", "category": "Vitamins", "stock": 2 },
                { "_id": "x2", "name": "Ibuprofen", "category": "Pain Relief", "stock": null },
            ]),
        ),
    );
    let admin = state.admin();

    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);

    let drugs = admin.drugs().snapshot();
    assert_eq!(drugs.len(), 2);
    assert_eq!(drugs[0].category, DrugCategory::Other);
    assert_eq!(drugs[1].stock, 0);
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_non_json_fetch_notifies_and_keeps_cache() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x1", 4)])));
    stub.respond_raw(
        "/api/admin/all-drugs",
        StatusCode::BAD_GATEWAY,
        "<html><body>502 Bad Gateway</body></html>",
    );
    let admin = state.admin();
    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);
    let mut rx = admin.notifier().subscribe();

    assert_eq!(admin.fetch_drugs().await, Outcome::Failed);

    let drugs = admin.drugs().snapshot();
    assert_eq!(drugs.len(), 1);
    assert_eq!(drugs[0].stock, 4);
    let note = next_note(&mut rx);
    assert_eq!(note.level, Level::Error);
    assert!(!note.message.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_non_json_mutation_fails_without_refetch() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-orders", ok("orders", json!([order("o1", "pending")])));
    stub.respond_raw(
        "/api/admin/update-order-status",
        StatusCode::OK,
        "<!doctype html><title>Maintenance</title>",
    );
    let admin = state.admin();
    assert_eq!(admin.fetch_orders().await, Outcome::Applied);
    let mut rx = admin.notifier().subscribe();

    let outcome = admin
        .update_order_status(&OrderId::new("o1"), OrderStatus::Completed)
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(stub.count("/api/admin/update-order-status"), 1);
    assert_eq!(stub.count("/api/admin/all-orders"), 1);
    assert_eq!(admin.orders().snapshot()[0].status, OrderStatus::Pending);
    assert_eq!(next_note(&mut rx).level, Level::Error);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unreachable_backend_notifies_on_fetch_and_mutation() {
    let dir = TempDir::new().unwrap();
    let mut config = ClientConfig::for_backend(
        closed_port_url().await.unwrap(),
        dir.path().join("session.json"),
    );
    config.http_timeout = Duration::from_secs(2);
    let client = BackendClient::new(&config).unwrap();
    let session = SessionStore::load(TokenStorage::new(config.session_file.clone()))
        .await
        .unwrap();
    session
        .set_token(Role::Admin, SecretString::from(TOKEN))
        .await
        .unwrap();
    let state = AppState::with_parts(config, client, session);
    let admin = state.admin();
    let mut rx = admin.notifier().subscribe();

    assert_eq!(admin.fetch_doctors().await, Outcome::Failed);
    assert!(admin.doctors().snapshot().is_empty());
    assert_eq!(next_note(&mut rx).level, Level::Error);

    assert_eq!(admin.delete_drug(&DrugId::new("x1")).await, Outcome::Failed);
    assert!(admin.drugs().snapshot().is_empty());
    assert_eq!(next_note(&mut rx).level, Level::Error);
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// Mutation then refresh
// =============================================================================

#[tokio::test]
async fn test_order_status_update_refetches_orders() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-orders", ok("orders", json!([order("o1", "pending")])));
    stub.respond("/api/admin/all-orders", ok("orders", json!([order("o1", "completed")])));
    stub.respond("/api/admin/update-order-status", message("Order status updated"));
    let admin = state.admin();

    assert_eq!(admin.fetch_orders().await, Outcome::Applied);
    assert_eq!(admin.orders().snapshot()[0].status, OrderStatus::Pending);

    let mut rx = admin.notifier().subscribe();
    let outcome = admin
        .update_order_status(&OrderId::new("o1"), OrderStatus::Completed)
        .await;

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(admin.orders().snapshot()[0].status, OrderStatus::Completed);
    assert!(!admin.orders().snapshot()[0].is_actionable());
    assert_eq!(stub.count("/api/admin/all-orders"), 2);

    let write = &stub.requests_to("/api/admin/update-order-status")[0];
    assert_eq!(write.method, "POST");
    assert_eq!(write.json, Some(json!({ "orderId": "o1", "status": "completed" })));
    assert_eq!(
        next_note(&mut rx),
        Notification {
            level: Level::Success,
            message: "Order status updated".to_string(),
        }
    );
}

#[tokio::test]
async fn test_rejected_mutation_keeps_cache_and_skips_refetch() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/all-doctors",
        ok(
            "doctors",
            json!([{ "_id": "d1", "name": "Dr Who", "available": true }]),
        ),
    );
    stub.respond(
        "/api/admin/change-availability",
        json!({ "success": false, "message": "not found" }),
    );
    let admin = state.admin();
    assert_eq!(admin.fetch_doctors().await, Outcome::Applied);
    let mut rx = admin.notifier().subscribe();

    let outcome = admin.change_availability(&DoctorId::new("d1")).await;

    assert_eq!(outcome, Outcome::Failed);
    assert!(admin.doctors().snapshot()[0].available);
    assert_eq!(stub.count("/api/admin/all-doctors"), 1);
    assert_eq!(
        stub.requests_to("/api/admin/change-availability")[0].json,
        Some(json!({ "docId": "d1" }))
    );
    assert_eq!(
        next_note(&mut rx),
        Notification {
            level: Level::Error,
            message: "not found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_cancel_appointment_refetches_appointments_only() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/appointments",
        ok("appointments", json!([appointment("a1")])),
    );
    stub.respond("/api/admin/cancel-appointment", message("Appointment Cancelled"));
    let admin = state.admin();

    let outcome = admin
        .cancel_appointment(&clinic_admin_core::AppointmentId::new("a1"))
        .await;

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stub.count("/api/admin/appointments"), 1);
    assert_eq!(stub.count("/api/admin/dashboard"), 0);
    assert_eq!(
        stub.requests_to("/api/admin/cancel-appointment")[0].json,
        Some(json!({ "appointmentId": "a1" }))
    );
}

#[tokio::test]
async fn test_drug_edits_save_one_call_per_field() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x1", 10)])));
    stub.respond("/api/admin/update-drug", message("Drug updated"));
    let admin = state.admin();
    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);

    let id = DrugId::new("x1");
    let mut buffer = EditBuffer::new();
    buffer.begin(id.clone());
    buffer.stage(id.clone(), DrugUpdate::Price(Decimal::new(45, 1)));
    buffer.stage(id.clone(), DrugUpdate::Stock(7));

    let outcomes = admin.save_drug_edits(&mut buffer, &id).await;

    assert_eq!(outcomes, [Outcome::Applied, Outcome::Applied]);
    assert!(!buffer.is_editing(&id));
    assert_eq!(buffer.pending_entities(), 0);

    let sequence: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        sequence,
        [
            "/api/admin/all-drugs",
            "/api/admin/update-drug",
            "/api/admin/all-drugs",
            "/api/admin/update-drug",
            "/api/admin/all-drugs",
        ]
    );

    let writes = stub.requests_to("/api/admin/update-drug");
    assert_eq!(writes[0].json, Some(json!({ "drugId": "x1", "price": 4.5 })));
    assert_eq!(writes[1].json, Some(json!({ "drugId": "x1", "stock": 7 })));
}

#[tokio::test]
async fn test_save_with_nothing_staged_sends_nothing() {
    let (stub, state, _dir) = setup().await;
    let id = DrugId::new("x1");
    let mut buffer = EditBuffer::<DrugId, DrugUpdate>::new();
    buffer.begin(id.clone());

    let outcomes = state.admin().save_drug_edits(&mut buffer, &id).await;

    assert!(outcomes.is_empty());
    assert!(buffer.is_editing(&id));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_in_stock_toggle_writes_stock() {
    let (stub, state, _dir) = setup().await;
    stub.respond(
        "/api/admin/all-drugs",
        ok("drugs", json!([drug("x1", 0), drug("x2", 12)])),
    );
    stub.respond("/api/admin/update-drug", message("Drug updated"));
    let admin = state.admin();
    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);

    let drugs = admin.drugs().snapshot();
    let mut buffer = EditBuffer::new();
    for drug in drugs.iter() {
        buffer.begin(drug.id.clone());
    }
    view::stage_in_stock(&mut buffer, &drugs[0], true);
    view::stage_in_stock(&mut buffer, &drugs[1], false);

    let rows = view::drug_rows(&drugs, &buffer);
    assert!(rows[0].in_stock);
    assert!(!rows[1].in_stock);

    admin.save_drug_edits(&mut buffer, &drugs[0].id).await;
    admin.save_drug_edits(&mut buffer, &drugs[1].id).await;

    let writes = stub.requests_to("/api/admin/update-drug");
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].json, Some(json!({ "drugId": "x1", "stock": 1 })));
    assert_eq!(writes[1].json, Some(json!({ "drugId": "x2", "stock": 0 })));
}

#[tokio::test]
async fn test_delete_drug_refetches_drugs() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x1", 3)])));
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([])));
    stub.respond("/api/admin/delete-drug", message("Drug deleted"));
    let admin = state.admin();
    assert_eq!(admin.fetch_drugs().await, Outcome::Applied);

    assert_eq!(admin.delete_drug(&DrugId::new("x1")).await, Outcome::Applied);

    assert!(admin.drugs().snapshot().is_empty());
    assert_eq!(
        stub.requests_to("/api/admin/delete-drug")[0].json,
        Some(json!({ "drugId": "x1" }))
    );
}

// =============================================================================
// Image uploads
// =============================================================================

#[tokio::test]
async fn test_add_drug_without_image_makes_no_request() {
    let (stub, state, _dir) = setup().await;
    let admin = state.admin();
    let mut rx = admin.notifier().subscribe();

    assert_eq!(admin.add_drug(&new_drug(), None).await, Outcome::Failed);

    assert!(stub.requests().is_empty());
    assert_eq!(
        next_note(&mut rx),
        Notification {
            level: Level::Error,
            message: "Drug image not selected".to_string(),
        }
    );
}

#[tokio::test]
async fn test_add_drug_sends_multipart_with_default_stock() {
    let (stub, state, _dir) = setup().await;
    stub.respond("/api/admin/add-drug", message("Drug added"));
    stub.respond("/api/admin/all-drugs", ok("drugs", json!([drug("x9", 0)])));
    let admin = state.admin();

    let image = ImageUpload::new("cetirizine.png", vec![0x89, 0x50, 0x4e, 0x47]);
    let outcome = admin.add_drug(&new_drug(), Some(image)).await;

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stub.count("/api/admin/all-drugs"), 1);

    let upload = &stub.requests_to("/api/admin/add-drug")[0];
    assert_eq!(upload.admin_token.as_deref(), Some(TOKEN));
    assert!(upload.json.is_none());
    assert!(upload.raw_body.contains("name=\"stock\"\r\n\r\n0\r\n"));
    assert!(upload.raw_body.contains("name=\"category\"\r\n\r\nAllergy\r\n"));
    assert!(upload.raw_body.contains("filename=\"cetirizine.png\""));
}
