use std::sync::Arc;

use tracing::{error, info, instrument};

use shared_models::{Appointment, NewAppointment, NewSlot, ScheduleSlot};
use shared_store::{CreateAppointmentOutcome, CreateSlotOutcome, StoreClient};

use crate::error::BookingError;
use crate::validators::Validators;

/// Mutations of the schedule ledger: claiming a slot when a booking is
/// confirmed, and creating slots on the admin path.
pub struct SlotLedgerService {
    store: Arc<StoreClient>,
    validators: Validators,
}

impl SlotLedgerService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self {
            store,
            validators: Validators::new(),
        }
    }

    /// Claim a slot for a client: create the appointment, then mark the slot
    /// unavailable. The two calls are deliberately separate (the store has
    /// no combined operation); the store's own 409 guard protects step one.
    /// A step-two failure leaves an appointment against a slot still marked
    /// open; the inconsistency is logged loudly rather than hidden, and the
    /// booking is still reported as created.
    #[instrument(skip(self, slot), fields(slot_id = slot.id))]
    pub async fn claim_slot(
        &self,
        slot: &ScheduleSlot,
        client_name: &str,
        client_phone: &str,
    ) -> Result<Appointment, BookingError> {
        let request = NewAppointment {
            specialist_id: slot.specialist_id,
            service_id: slot.service_id,
            date: slot.date,
            time: slot.time,
            client_name: client_name.to_string(),
            client_phone: client_phone.to_string(),
        };

        let appointment = match self
            .store
            .create_appointment(&request)
            .await
            .map_err(BookingError::RemoteUnavailable)?
        {
            CreateAppointmentOutcome::Created(appointment) => appointment,
            CreateAppointmentOutcome::SlotTaken => return Err(BookingError::SlotTaken),
        };

        if let Err(e) = self.store.set_slot_availability(slot.id, false).await {
            error!(
                "appointment {} created but slot {} is still marked available: {}",
                appointment.id, slot.id, e
            );
        } else {
            info!("slot {} claimed by appointment {}", slot.id, appointment.id);
        }

        Ok(appointment)
    }

    /// Admin-side slot creation. Slots are born available; the store refuses
    /// a duplicate (specialist, service, date, time) tuple with 409.
    pub async fn create_slot(
        &self,
        specialist_id: i64,
        service_id: i64,
        date: &str,
        time: &str,
    ) -> Result<ScheduleSlot, BookingError> {
        let date = self
            .validators
            .calendar_date(date)
            .ok_or_else(|| BookingError::Validation("дата должна быть в формате ГГГГ-ММ-ДД".into()))?;
        let time = self.validators.admin_time(time).ok_or_else(|| {
            BookingError::Validation("время должно быть в формате ЧЧ:ММ с шагом 5 минут".into())
        })?;

        let slot = NewSlot {
            specialist_id,
            service_id,
            date,
            time,
            available: true,
        };

        match self
            .store
            .create_slot(&slot)
            .await
            .map_err(BookingError::RemoteUnavailable)?
        {
            CreateSlotOutcome::Created(created) => Ok(created),
            CreateSlotOutcome::Duplicate => Err(BookingError::Validation(
                "такой слот уже существует".into(),
            )),
        }
    }
}
