//! JSON builders for Booking Store rows, shared by the wiremock suites of
//! the cells. Shapes mirror the store envelopes: lists under `data`,
//! availability as 0/1, times as "HH:MM".

use serde_json::{json, Value};

pub fn success_list(data: Vec<Value>) -> Value {
    json!({ "message": "success", "data": data })
}

pub fn success_dates(dates: &[&str]) -> Value {
    json!({ "message": "success", "availableDates": dates })
}

pub fn specialist_row(id: i64, name: &str, chat_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "photoUrl": null,
        "chatId": chat_id,
    })
}

pub fn service_row(id: i64, name: &str, price: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": null,
        "price": price,
    })
}

pub fn slot_row(id: i64, specialist_id: i64, service_id: i64, date: &str, time: &str) -> Value {
    json!({
        "id": id,
        "specialistId": specialist_id,
        "serviceId": service_id,
        "date": date,
        "time": time,
        "available": 1,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn appointment_row(
    id: i64,
    specialist_id: i64,
    service_id: i64,
    date: &str,
    time: &str,
    client_chat_id: Option<i64>,
    specialist_chat_id: Option<i64>,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "specialistId": specialist_id,
        "serviceId": service_id,
        "date": date,
        "time": time,
        "price": 2500,
        "clientName": "Анна",
        "clientPhone": "+79255355278",
        "clientChatId": client_chat_id,
        "specialistChatId": specialist_chat_id,
        "serviceName": "Маникюр",
        "specialistName": "Мария",
        "createdAt": created_at,
    })
}
