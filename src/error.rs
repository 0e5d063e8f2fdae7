//! Error types for studio operations.

/// Longest error-body excerpt carried into an error message.
const MAX_BODY_EXCERPT: usize = 300;

/// Known substring the API returns when a key is rejected.
///
/// Rejected keys can arrive with a 400 status rather than 401/403, so the
/// body is matched in addition to the status code.
pub(crate) const BAD_KEY_SIGNATURE: &str = "API key not valid";

/// Errors that can occur while preparing or running a submission.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Input rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// The selected file could not be read.
    #[error("failed to read image: {0}")]
    Read(String),

    /// The API responded without an extractable image.
    #[error("{0}")]
    NoImage(String),

    /// API key missing, invalid, or not yet selected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned a non-success status outside the auth classification.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode image data: {0}")]
    Decode(String),

    /// I/O error (e.g. saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host environment exposes no API-key selector.
    #[error("API key selection is not available in this environment")]
    SelectorUnavailable,
}

impl StudioError {
    /// Returns true if this failure should send the user to the key gate.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns true if this failure was raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Read(_))
    }
}

/// Classifies a non-success API response into the error taxonomy.
///
/// 401/403 and the bad-key body signature are authentication failures;
/// everything else passes through with its status and a body excerpt.
pub(crate) fn classify_status(status: u16, body: &str) -> StudioError {
    let message = excerpt(body);
    if status == 401 || status == 403 || body.contains(BAD_KEY_SIGNATURE) {
        return StudioError::Auth(message);
    }
    StudioError::Api { status, message }
}

/// Trims an error body to a readable single-line excerpt.
pub(crate) fn excerpt(body: &str) -> String {
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "(empty response body)".to_string();
    }
    match flat.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
