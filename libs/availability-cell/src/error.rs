use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// The Booking Store could not be reached or answered with a failure.
    /// Kept distinct from an empty result so callers can tell "no slots"
    /// from "fetch failed".
    #[error("booking store is unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}
