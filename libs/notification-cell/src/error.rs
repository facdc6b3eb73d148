use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    /// The candidate list itself could not be fetched; the run is aborted.
    /// Per-recipient send failures never raise this, they are counted in
    /// the run report instead.
    #[error("booking store is unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}
