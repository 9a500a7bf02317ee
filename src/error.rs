use thiserror::Error;

/// Failures while fetching the wheel entries or resolving one of their images
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Wheel data source returned no entries")]
    NoEntries,

    #[error("Image unavailable: {reference}")]
    ImageUnavailable { reference: String },
}

/// Failures of a single poll cycle. All of them are swallowed by the synchronizer.
/// A command the widget doesn't understand is not one of them: it arrives as
/// a snapshot without an action.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No answer from the control server yet")]
    NoResponse,
}
