pub mod client;

pub use client::{
    AppointmentsQuery, CreateAppointmentOutcome, CreateSlotOutcome, StoreClient,
};
