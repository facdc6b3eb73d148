use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("gateway transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected the call ({status}): {description}")]
    Rejected { status: u16, description: String },
}
