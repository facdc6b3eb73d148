use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use shared_models::{ScheduleSlot, Service, Specialist};
use shared_store::StoreClient;
use shared_utils::time;

use crate::error::AvailabilityError;

/// How far ahead the entry lists look when deciding whether a (specialist,
/// service) pair is worth showing at all.
const LOOKAHEAD_DAYS: i64 = 7;

/// Upper bound for the week-by-week probe of the service-first view.
const PROBE_HORIZON_DAYS: i64 = 90;

/// One bookable time on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotOption {
    pub slot_id: i64,
    pub time: NaiveTime,
}

pub struct AvailabilityService {
    store: Arc<StoreClient>,
}

impl AvailabilityService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Dates with at least one open slot for the pair, sorted, never earlier
    /// than today.
    pub async fn available_dates(
        &self,
        specialist_id: i64,
        service_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        let today = time::today();
        let from = time::clamp_to_today(from, today);
        if from > to {
            return Ok(Vec::new());
        }

        let mut dates = self
            .store
            .available_dates(specialist_id, service_id, from, to)
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        dates.retain(|date| *date >= today);
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    /// Bookable times on one date, ordered, filtered by the near-term cutoff.
    pub async fn time_slots(
        &self,
        specialist_id: i64,
        service_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<SlotOption>, AvailabilityError> {
        let slots = self
            .store
            .day_schedule(specialist_id, service_id, date)
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let now = time::now();
        let mut options: Vec<SlotOption> = slots
            .iter()
            .filter(|slot| slot.available && time::is_near_term_or_future(slot.starts_at(), now))
            .map(|slot| SlotOption {
                slot_id: slot.id,
                time: slot.time,
            })
            .collect();
        options.sort_by_key(|option| option.time);

        debug!(
            "Resolved {} bookable times for specialist {} service {} on {}",
            options.len(),
            specialist_id,
            service_id,
            date
        );
        Ok(options)
    }

    /// The raw open slot rows for one date. The ledger needs the full row to
    /// claim from, the menus only need `time_slots`.
    pub async fn open_slots(
        &self,
        specialist_id: i64,
        service_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleSlot>, AvailabilityError> {
        let slots = self
            .store
            .day_schedule(specialist_id, service_id, date)
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let now = time::now();
        Ok(slots
            .into_iter()
            .filter(|slot| slot.available && time::is_near_term_or_future(slot.starts_at(), now))
            .collect())
    }

    /// Week window for a pivot date: `[clamp_to_today(monday), monday + 6d]`.
    pub fn week_window(pivot: NaiveDate, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let monday = time::start_of_week(pivot);
        (time::clamp_to_today(monday, today), monday + Duration::days(6))
    }

    /// Probe forward week by week (up to 90 days) for the first week with at
    /// least one bookable date. Returns the week's Monday and its dates.
    pub async fn next_nonempty_week(
        &self,
        specialist_id: i64,
        service_id: i64,
        pivot: NaiveDate,
    ) -> Result<Option<(NaiveDate, Vec<NaiveDate>)>, AvailabilityError> {
        let today = time::today();
        let horizon = today + Duration::days(PROBE_HORIZON_DAYS);
        let mut monday = time::start_of_week(pivot.max(today));

        while monday <= horizon {
            let (from, to) = Self::week_window(monday, today);
            let dates = self
                .available_dates(specialist_id, service_id, from, to)
                .await?;
            if !dates.is_empty() {
                return Ok(Some((monday, dates)));
            }
            monday += Duration::days(7);
        }

        Ok(None)
    }

    /// Specialists worth listing for the specialist-first entry: currently
    /// bookable and holding at least one qualifying slot in the lookahead
    /// window for any of their services.
    pub async fn specialists_with_open_slots(&self) -> Result<Vec<Specialist>, AvailabilityError> {
        let specialists = self
            .store
            .bookable_specialists()
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let mut qualifying = Vec::new();
        for specialist in specialists {
            let services = self
                .store
                .specialist_services(specialist.id)
                .await
                .map_err(AvailabilityError::StoreUnavailable)?;

            for service in &services {
                if self.pair_has_open_dates(specialist.id, service.id).await? {
                    qualifying.push(specialist);
                    break;
                }
            }
        }
        Ok(qualifying)
    }

    /// Specialists offering the chosen service with a qualifying slot.
    pub async fn specialists_for_service(
        &self,
        service_id: i64,
    ) -> Result<Vec<Specialist>, AvailabilityError> {
        let specialists = self
            .store
            .bookable_specialists()
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let mut qualifying = Vec::new();
        for specialist in specialists {
            let services = self
                .store
                .specialist_services(specialist.id)
                .await
                .map_err(AvailabilityError::StoreUnavailable)?;
            if !services.iter().any(|service| service.id == service_id) {
                continue;
            }
            if self.pair_has_open_dates(specialist.id, service_id).await? {
                qualifying.push(specialist);
            }
        }
        Ok(qualifying)
    }

    /// Services worth listing for the service-first entry.
    pub async fn services_with_open_slots(&self) -> Result<Vec<Service>, AvailabilityError> {
        let services = self
            .store
            .services_all()
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;
        let specialists = self
            .store
            .bookable_specialists()
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let mut qualifying = Vec::new();
        for service in services {
            for specialist in &specialists {
                if self.pair_has_open_dates(specialist.id, service.id).await? {
                    qualifying.push(service);
                    break;
                }
            }
        }
        Ok(qualifying)
    }

    /// Services of one specialist with a qualifying slot.
    pub async fn services_for_specialist(
        &self,
        specialist_id: i64,
    ) -> Result<Vec<Service>, AvailabilityError> {
        let services = self
            .store
            .specialist_services(specialist_id)
            .await
            .map_err(AvailabilityError::StoreUnavailable)?;

        let mut qualifying = Vec::new();
        for service in services {
            if self.pair_has_open_dates(specialist_id, service.id).await? {
                qualifying.push(service);
            }
        }
        Ok(qualifying)
    }

    async fn pair_has_open_dates(
        &self,
        specialist_id: i64,
        service_id: i64,
    ) -> Result<bool, AvailabilityError> {
        let today = time::today();
        let dates = self
            .available_dates(
                specialist_id,
                service_id,
                today,
                today + Duration::days(LOOKAHEAD_DAYS),
            )
            .await?;
        Ok(!dates.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_window_clamps_the_current_week_to_today() {
        // 2026-08-19 is a Wednesday; its week is 17..23.
        let today = date(2026, 8, 19);
        let (from, to) = AvailabilityService::week_window(date(2026, 8, 19), today);
        assert_eq!(from, date(2026, 8, 19));
        assert_eq!(to, date(2026, 8, 23));
    }

    #[test]
    fn week_window_of_a_future_week_is_the_full_week() {
        let today = date(2026, 8, 19);
        let (from, to) = AvailabilityService::week_window(date(2026, 8, 26), today);
        assert_eq!(from, date(2026, 8, 24));
        assert_eq!(to, date(2026, 8, 30));
    }
}
