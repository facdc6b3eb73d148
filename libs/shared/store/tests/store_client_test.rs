use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_models::{NewAppointment, NotificationKind};
use shared_store::{AppointmentsQuery, CreateAppointmentOutcome, StoreClient};
use shared_utils::test_support::{appointment_row, slot_row, specialist_row, success_list};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn specialists_all_parses_joined_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specialists-all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_list(vec![
            specialist_row(1, "Мария", Some(200600)),
            specialist_row(2, "Ольга", None),
        ])))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let specialists = client.specialists_all().await.unwrap();

    assert_eq!(specialists.len(), 2);
    assert_eq!(specialists[0].chat_id, Some(200600));
    assert_eq!(specialists[1].name, "Ольга");
}

#[tokio::test]
async fn available_dates_reads_the_dates_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specialist/1/service/2/available-dates"))
        .and(query_param("start", "2026-09-01"))
        .and(query_param("end", "2026-09-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "availableDates": ["2026-09-02", "2026-09-04"],
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let dates = client
        .available_dates(1, 2, date(2026, 9, 1), date(2026, 9, 7))
        .await
        .unwrap();

    assert_eq!(dates, vec![date(2026, 9, 2), date(2026, 9, 4)]);
}

#[tokio::test]
async fn malformed_dates_payload_is_an_error_not_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specialist/1/service/2/available-dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "availableDates": ["not-a-date", 42],
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let result = client
        .available_dates(1, 2, date(2026, 9, 1), date(2026, 9, 7))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn create_appointment_maps_conflict_to_slot_taken() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointment"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "slot is not available" })),
        )
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let request = NewAppointment {
        specialist_id: 1,
        service_id: 2,
        date: date(2026, 9, 2),
        time: chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        client_name: "Анна".to_string(),
        client_phone: "+79255355278".to_string(),
    };

    let outcome = client.create_appointment(&request).await.unwrap();
    assert!(matches!(outcome, CreateAppointmentOutcome::SlotTaken));
}

#[tokio::test]
async fn non_success_envelope_is_an_error_not_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specialist/1/service/2/schedule/2026-09-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "db locked" })))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let result = client.day_schedule(1, 2, date(2026, 9, 2)).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn appointments_query_serializes_only_present_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("specialistId", "1"))
        .and(query_param("createdSince", "2026-08-23 00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_list(vec![
            appointment_row(
                12,
                1,
                2,
                "2026-08-24",
                "11:00",
                Some(100500),
                Some(200600),
                "2026-08-23 14:03:00",
            ),
        ])))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let query = AppointmentsQuery {
        specialist_id: Some(1),
        created_since: date(2026, 8, 23).and_hms_opt(0, 0, 0),
        ..Default::default()
    };

    let rows = client.appointments(&query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].client_chat_id, Some(100500));
}

#[tokio::test]
async fn notification_dedup_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check-notification"))
        .and(query_param("appointmentId", "12"))
        .and(query_param("kind", "hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": { "sent": false },
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notification-sent"))
        .and(body_json(json!({ "appointmentId": 12, "kind": "hourly" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "success" })))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    assert!(!client
        .was_notification_sent(12, NotificationKind::Hourly)
        .await
        .unwrap());
    client
        .mark_notification_sent(12, NotificationKind::Hourly)
        .await
        .unwrap();
}

#[tokio::test]
async fn day_schedule_parses_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specialist/1/service/2/schedule/2026-09-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_list(vec![
            slot_row(7, 1, 2, "2026-09-02", "11:00"),
        ])))
        .mount(&server)
        .await;

    let client = StoreClient::new(&server.uri());
    let slots = client.day_schedule(1, 2, date(2026, 9, 2)).await.unwrap();

    assert_eq!(slots.len(), 1);
    assert!(slots[0].available);
    assert_eq!(slots[0].id, 7);
}
