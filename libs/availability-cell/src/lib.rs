pub mod error;
pub mod services;

pub use error::AvailabilityError;
pub use services::availability::{AvailabilityService, SlotOption};
