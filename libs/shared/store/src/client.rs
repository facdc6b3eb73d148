use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_models::{Appointment, NewAppointment, NewSlot, NotificationKind, ScheduleSlot, Service, Specialist};

/// Outcome of `POST /appointment`. The store answers 409 when the slot has
/// already been claimed; that is a normal race outcome, not a transport
/// failure.
#[derive(Debug)]
pub enum CreateAppointmentOutcome {
    Created(Appointment),
    SlotTaken,
}

/// Outcome of `POST /schedule`. A duplicate (specialist, service, date, time)
/// tuple is refused by the store with 409.
#[derive(Debug)]
pub enum CreateSlotOutcome {
    Created(ScheduleSlot),
    Duplicate,
}

/// Filters for `GET /appointments`. All fields optional; omitted fields are
/// not sent as query parameters.
#[derive(Debug, Default, Clone)]
pub struct AppointmentsQuery {
    pub specialist_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_since: Option<NaiveDateTime>,
}

pub struct StoreClient {
    client: Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Booking Store request: {} {}", method, url);

        let mut req = self.client.request(method, &url);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        Ok((status, payload))
    }

    /// Request expecting a `{"message": "success", ...}` envelope; anything
    /// else becomes an error carrying the store's own message.
    async fn request_success(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let (status, payload) = self.request(method, path, body).await?;

        if !status.is_success() || payload["message"] != "success" {
            error!("Booking Store error ({}) at {}: {}", status, path, payload);
            return Err(anyhow!("store error ({}) at {}: {}", status, path, payload["message"]));
        }

        Ok(payload)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut payload = self.request_success(Method::GET, path, None).await?;
        let rows = serde_json::from_value(payload["data"].take())?;
        Ok(rows)
    }

    /// Full roster, chat ids included where the specialist linked one.
    pub async fn specialists_all(&self) -> Result<Vec<Specialist>> {
        self.fetch_list("/specialists-all").await
    }

    /// Only specialists currently open for booking.
    pub async fn bookable_specialists(&self) -> Result<Vec<Specialist>> {
        self.fetch_list("/specialists").await
    }

    pub async fn services_all(&self) -> Result<Vec<Service>> {
        self.fetch_list("/services-all").await
    }

    pub async fn specialist_services(&self, specialist_id: i64) -> Result<Vec<Service>> {
        self.fetch_list(&format!("/specialist/{}/services", specialist_id))
            .await
    }

    pub async fn available_dates(
        &self,
        specialist_id: i64,
        service_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let path = format!(
            "/specialist/{}/service/{}/available-dates?start={}&end={}",
            specialist_id, service_id, start, end
        );
        let mut payload = self.request_success(Method::GET, &path, None).await?;
        let dates: Vec<NaiveDate> = serde_json::from_value(payload["availableDates"].take())?;
        Ok(dates)
    }

    /// Open slots for one (specialist, service) pair on one date.
    pub async fn day_schedule(
        &self,
        specialist_id: i64,
        service_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleSlot>> {
        self.fetch_list(&format!(
            "/specialist/{}/service/{}/schedule/{}",
            specialist_id, service_id, date
        ))
        .await
    }

    pub async fn create_slot(&self, slot: &NewSlot) -> Result<CreateSlotOutcome> {
        let (status, payload) = self
            .request(Method::POST, "/schedule", Some(serde_json::to_value(slot)?))
            .await?;

        if status == StatusCode::CONFLICT {
            return Ok(CreateSlotOutcome::Duplicate);
        }
        if !status.is_success() || payload["message"] != "success" {
            error!("Booking Store error ({}) creating slot: {}", status, payload);
            return Err(anyhow!("store error ({}) creating slot", status));
        }

        let created = serde_json::from_value(payload["data"].clone())?;
        Ok(CreateSlotOutcome::Created(created))
    }

    pub async fn set_slot_availability(&self, slot_id: i64, available: bool) -> Result<()> {
        let body = json!({ "available": u8::from(available) });
        self.request_success(Method::PATCH, &format!("/schedule/{}", slot_id), Some(body))
            .await?;
        Ok(())
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<CreateAppointmentOutcome> {
        let (status, payload) = self
            .request(
                Method::POST,
                "/appointment",
                Some(serde_json::to_value(appointment)?),
            )
            .await?;

        if status == StatusCode::CONFLICT {
            return Ok(CreateAppointmentOutcome::SlotTaken);
        }
        if !status.is_success() || payload["message"] != "success" {
            error!("Booking Store error ({}) creating appointment: {}", status, payload);
            return Err(anyhow!("store error ({}) creating appointment", status));
        }

        let created = serde_json::from_value(payload["appointment"].clone())?;
        Ok(CreateAppointmentOutcome::Created(created))
    }

    pub async fn appointments(&self, query: &AppointmentsQuery) -> Result<Vec<Appointment>> {
        let mut params = Vec::new();
        if let Some(specialist_id) = query.specialist_id {
            params.push(format!("specialistId={}", specialist_id));
        }
        if let Some(start) = query.start_date {
            params.push(format!("startDate={}", start));
        }
        if let Some(end) = query.end_date {
            params.push(format!("endDate={}", end));
        }
        if let Some(since) = query.created_since {
            params.push(format!(
                "createdSince={}",
                since.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        let path = if params.is_empty() {
            "/appointments".to_string()
        } else {
            format!("/appointments?{}", params.join("&"))
        };
        self.fetch_list(&path).await
    }

    /// Reminder candidates whose start time is near, in joined-row shape.
    pub async fn hourly_reminder_candidates(&self) -> Result<Vec<Appointment>> {
        self.fetch_list("/appointments-for-hourly-simple").await
    }

    /// Tomorrow-facing reminder candidates, in joined-row shape.
    pub async fn daily_reminder_candidates(&self) -> Result<Vec<Appointment>> {
        self.fetch_list("/appointments-for-daily-simple").await
    }

    pub async fn was_notification_sent(&self, appointment_id: i64, kind: NotificationKind) -> Result<bool> {
        let path = format!(
            "/check-notification?appointmentId={}&kind={}",
            appointment_id, kind
        );
        let payload = self.request_success(Method::GET, &path, None).await?;
        Ok(payload["data"]["sent"].as_bool().unwrap_or(false))
    }

    pub async fn mark_notification_sent(&self, appointment_id: i64, kind: NotificationKind) -> Result<()> {
        let body = json!({
            "appointmentId": appointment_id,
            "kind": kind.to_string(),
        });
        self.request_success(Method::POST, "/notification-sent", Some(body))
            .await?;
        Ok(())
    }
}
