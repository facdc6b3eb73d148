/// Live Booking Store Smoke Suite
///
/// Drives a locally running Booking Store through the same client the bot
/// uses, covering the read endpoints, the two-step booking flow and the
/// notification dedup markers.
///
/// Expects the store at http://localhost:3000. The write path works on a
/// far-future date so it never collides with real bookings.

use chrono::{Duration, NaiveTime};
use shared_models::{NewAppointment, NewSlot, NotificationKind};
use shared_store::{
    AppointmentsQuery, CreateAppointmentOutcome, CreateSlotOutcome, StoreClient,
};
use shared_utils::time;

const BASE_URL: &str = "http://localhost:3000";

/// Test results tracker
#[derive(Debug, Default)]
pub struct TestResults {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub failures: Vec<String>,
}

impl TestResults {
    pub fn pass(&mut self, test_name: &str) {
        self.passed += 1;
        println!("✅ {}", test_name);
    }

    pub fn fail(&mut self, test_name: &str, error: &str) {
        self.failed += 1;
        self.failures.push(format!("{}: {}", test_name, error));
        println!("❌ {}: {}", test_name, error);
    }

    pub fn skip(&mut self, test_name: &str, reason: &str) {
        self.skipped += 1;
        println!("⚠️ {} (skipped: {})", test_name, reason);
    }

    pub fn summary(&self) {
        println!("\n📊 Test Summary:");
        println!("✅ Passed: {}", self.passed);
        println!("❌ Failed: {}", self.failed);
        println!("⚠️ Skipped: {}", self.skipped);

        if !self.failures.is_empty() {
            println!("\n🔍 Failures:");
            for failure in &self.failures {
                println!("  - {}", failure);
            }
        }
    }
}

pub async fn run_store_smoke() -> TestResults {
    let store = StoreClient::new(BASE_URL);
    let mut results = TestResults::default();

    println!("🚀 Starting Booking Store Smoke Suite");
    println!("📍 Base URL: {}", BASE_URL);

    // READ ENDPOINTS
    println!("\n📖 Catalog Reads");

    let specialists = match store.specialists_all().await {
        Ok(specialists) => {
            results.pass("Specialist roster");
            specialists
        }
        Err(e) => {
            results.fail("Specialist roster", &e.to_string());
            results.summary();
            return results; // nothing else can work without the store
        }
    };

    match store.services_all().await {
        Ok(_) => results.pass("Service catalog"),
        Err(e) => results.fail("Service catalog", &e.to_string()),
    }

    let bookable = match store.bookable_specialists().await {
        Ok(bookable) => {
            results.pass("Bookable specialists");
            bookable
        }
        Err(e) => {
            results.fail("Bookable specialists", &e.to_string());
            Vec::new()
        }
    };

    let Some(specialist) = bookable.first().or(specialists.first()) else {
        results.skip("Availability flow", "store has no specialists");
        results.summary();
        return results;
    };

    let services = match store.specialist_services(specialist.id).await {
        Ok(services) => {
            results.pass("Specialist services");
            services
        }
        Err(e) => {
            results.fail("Specialist services", &e.to_string());
            Vec::new()
        }
    };

    let Some(service) = services.first() else {
        results.skip("Availability flow", "specialist offers no services");
        results.summary();
        return results;
    };

    // AVAILABILITY
    println!("\n📅 Availability");

    let today = time::today();
    match store
        .available_dates(specialist.id, service.id, today, today + Duration::days(30))
        .await
    {
        Ok(dates) => {
            results.pass("Available dates");
            if let Some(date) = dates.first() {
                match store.day_schedule(specialist.id, service.id, *date).await {
                    Ok(_) => results.pass("Day schedule"),
                    Err(e) => results.fail("Day schedule", &e.to_string()),
                }
            } else {
                results.skip("Day schedule", "no open dates in the next 30 days");
            }
        }
        Err(e) => results.fail("Available dates", &e.to_string()),
    }

    // BOOKING FLOW (far-future slot, away from real traffic)
    println!("\n📝 Booking Flow");

    let probe_date = today + Duration::days(60);
    let probe_time = NaiveTime::from_hms_opt(12, 35, 0).expect("12:35 is valid");
    let new_slot = NewSlot {
        specialist_id: specialist.id,
        service_id: service.id,
        date: probe_date,
        time: probe_time,
        available: true,
    };

    let slot = match store.create_slot(&new_slot).await {
        Ok(CreateSlotOutcome::Created(slot)) => {
            results.pass("Slot creation");
            Some(slot)
        }
        Ok(CreateSlotOutcome::Duplicate) => {
            results.pass("Slot creation (duplicate refused with 409)");
            None
        }
        Err(e) => {
            results.fail("Slot creation", &e.to_string());
            None
        }
    };

    if let Some(slot) = slot {
        let request = NewAppointment {
            specialist_id: slot.specialist_id,
            service_id: slot.service_id,
            date: slot.date,
            time: slot.time,
            client_name: "Smoke Test".to_string(),
            client_phone: "+79000000000".to_string(),
        };

        match store.create_appointment(&request).await {
            Ok(CreateAppointmentOutcome::Created(appointment)) => {
                results.pass("Appointment creation");

                match store.set_slot_availability(slot.id, false).await {
                    Ok(()) => results.pass("Slot claim (PATCH available=0)"),
                    Err(e) => results.fail("Slot claim (PATCH available=0)", &e.to_string()),
                }

                let midnight = today.and_hms_opt(0, 0, 0).expect("midnight is valid");
                let query = AppointmentsQuery {
                    specialist_id: Some(specialist.id),
                    created_since: Some(midnight),
                    ..Default::default()
                };
                match store.appointments(&query).await {
                    Ok(rows) if rows.iter().any(|row| row.id == appointment.id) => {
                        results.pass("Created appointment visible via createdSince")
                    }
                    Ok(_) => results.fail(
                        "Created appointment visible via createdSince",
                        "appointment missing from the filtered list",
                    ),
                    Err(e) => {
                        results.fail("Created appointment visible via createdSince", &e.to_string())
                    }
                }

                // NOTIFICATION MARKERS
                println!("\n🔔 Notification Markers");

                match store
                    .was_notification_sent(appointment.id, NotificationKind::Immediate)
                    .await
                {
                    Ok(false) => results.pass("Fresh appointment has no immediate marker"),
                    Ok(true) => results.fail(
                        "Fresh appointment has no immediate marker",
                        "marker already present",
                    ),
                    Err(e) => {
                        results.fail("Fresh appointment has no immediate marker", &e.to_string())
                    }
                }

                match store
                    .mark_notification_sent(appointment.id, NotificationKind::Immediate)
                    .await
                {
                    Ok(()) => results.pass("Immediate marker write"),
                    Err(e) => results.fail("Immediate marker write", &e.to_string()),
                }

                match store
                    .was_notification_sent(appointment.id, NotificationKind::Immediate)
                    .await
                {
                    Ok(true) => results.pass("Immediate marker read-back"),
                    Ok(false) => {
                        results.fail("Immediate marker read-back", "marker not persisted")
                    }
                    Err(e) => results.fail("Immediate marker read-back", &e.to_string()),
                }
            }
            Ok(CreateAppointmentOutcome::SlotTaken) => {
                results.pass("Appointment creation (slot race refused with 409)");
            }
            Err(e) => results.fail("Appointment creation", &e.to_string()),
        }
    } else {
        results.skip("Appointment creation", "no fresh slot to claim");
    }

    // REMINDER CANDIDATE ENDPOINTS
    println!("\n⏰ Reminder Candidates");

    match store.hourly_reminder_candidates().await {
        Ok(_) => results.pass("Hourly candidates endpoint"),
        Err(e) => results.fail("Hourly candidates endpoint", &e.to_string()),
    }
    match store.daily_reminder_candidates().await {
        Ok(_) => results.pass("Daily candidates endpoint"),
        Err(e) => results.fail("Daily candidates endpoint", &e.to_string()),
    }

    results.summary();
    results
}

#[tokio::main]
async fn main() {
    let results = run_store_smoke().await;
    if results.failed > 0 {
        std::process::exit(1);
    }
}
