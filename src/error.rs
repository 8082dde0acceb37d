use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upstream fetch of '{url}' failed with status {status}: {reason}")]
    Upstream {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Pagination count not found on '{url}'")]
    PageCount { url: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScrapeError::Decode(err.to_string())
        } else {
            ScrapeError::Network(err.to_string())
        }
    }
}
