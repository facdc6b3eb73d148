use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveTime};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::{BookingError, SlotLedgerService};
use shared_models::ScheduleSlot;
use shared_store::StoreClient;
use shared_utils::test_support::appointment_row;
use shared_utils::time;

fn ledger(server: &MockServer) -> SlotLedgerService {
    SlotLedgerService::new(Arc::new(StoreClient::new(&server.uri())))
}

fn open_slot(id: i64) -> ScheduleSlot {
    ScheduleSlot {
        id,
        specialist_id: 7,
        service_id: 3,
        date: time::today() + Duration::days(1),
        time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        available: true,
    }
}

#[tokio::test]
async fn a_claim_creates_the_appointment_and_closes_the_slot() {
    let server = MockServer::start().await;
    let slot = open_slot(42);
    let date = slot.date.to_string();

    Mock::given(method("POST"))
        .and(path("/appointment"))
        .and(body_partial_json(json!({
            "clientName": "Анна",
            "clientPhone": "+79255355278",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "appointment": appointment_row(
                901, 7, 3, &date, "12:00", Some(100500), Some(200600),
                "2026-08-23 14:03:00",
            ),
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/schedule/42"))
        .and(body_partial_json(json!({ "available": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let appointment = ledger(&server)
        .claim_slot(&slot, "Анна", "+79255355278")
        .await
        .unwrap();

    assert_eq!(appointment.id, 901);
    server.verify().await;
}

#[tokio::test]
async fn a_failed_slot_patch_still_reports_the_booking_created() {
    let server = MockServer::start().await;
    let slot = open_slot(42);
    let date = slot.date.to_string();

    Mock::given(method("POST"))
        .and(path("/appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "appointment": appointment_row(
                902, 7, 3, &date, "12:00", Some(100500), Some(200600),
                "2026-08-23 14:03:00",
            ),
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "db locked" })))
        .mount(&server)
        .await;

    let appointment = ledger(&server)
        .claim_slot(&slot, "Анна", "+79255355278")
        .await
        .unwrap();

    assert_eq!(appointment.id, 902);
}

#[tokio::test]
async fn losing_the_race_is_slot_taken_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointment"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "slot is not available" })),
        )
        .mount(&server)
        .await;

    let result = ledger(&server)
        .claim_slot(&open_slot(42), "Анна", "+79255355278")
        .await;

    assert_matches!(result, Err(BookingError::SlotTaken));
}

#[tokio::test]
async fn duplicate_slot_creation_is_a_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "slot already exists" })),
        )
        .mount(&server)
        .await;

    let result = ledger(&server)
        .create_slot(7, 3, "2026-09-02", "12:00")
        .await;

    assert_matches!(result, Err(BookingError::Validation(_)));
}

#[tokio::test]
async fn off_grid_time_is_rejected_before_any_store_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "success" })))
        .expect(0)
        .mount(&server)
        .await;

    let bad_time = ledger(&server).create_slot(7, 3, "2026-09-02", "12:03").await;
    let bad_date = ledger(&server).create_slot(7, 3, "02.09.2026", "12:00").await;

    assert_matches!(bad_time, Err(BookingError::Validation(_)));
    assert_matches!(bad_date, Err(BookingError::Validation(_)));
    server.verify().await;
}
