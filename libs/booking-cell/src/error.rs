use thiserror::Error;

use availability_cell::AvailabilityError;
use messaging_cell::MessagingError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("booking store is unavailable: {0}")]
    RemoteUnavailable(#[source] anyhow::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("slot has already been taken")]
    SlotTaken,

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("messaging gateway failure: {0}")]
    Messaging(#[from] MessagingError),
}
