use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures a practice run can end with.
///
/// Row-level problems in the sheet are not represented here: malformed rows
/// are dropped or normalized while parsing and never fail a run.
#[derive(Debug, Error)]
pub enum PracticeError {
    /// The run configuration cannot be used (placeholder URL, zero words).
    /// Reported before any network call is made.
    #[error("{0}")]
    Configuration(String),

    /// The server answered with a non-success status.
    #[error("sheet request failed (HTTP {status}): {url}")]
    HttpStatus { url: String, status: u16 },

    /// The request could not be completed or the body could not be read.
    #[error("failed to download sheet from {url}: {reason}")]
    Fetch {
        url: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Anything else that went wrong inside the background worker.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PracticeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PracticeError::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PracticeError::Configuration(_))
    }

    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            PracticeError::Configuration(message) => message.clone(),
            PracticeError::HttpStatus { .. } | PracticeError::Fetch { .. } => {
                format!("Failed to read data from Google Sheet: {self}")
            }
            PracticeError::Unexpected(message) => format!("Error: {message}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PracticeError>;
