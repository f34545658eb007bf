/// Core error type for calldesk.
///
/// Adapter crates should map their specific errors into this type so every
/// view can degrade the same way: show a message, keep prior state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Missing required field, empty message body, out-of-range setting.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend answered, but with `success: false` or a non-2xx status.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure (connection refused, timeout, bad body).
    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
