//! realm-greetings error types

use std::sync::Arc;

/// Errors surfaced by the greeting lookup caches.
///
/// None of these are ever cached: a failed load leaves the cache entry
/// absent, so the next access to the same key tries again.
///
/// `Clone` because a single failed load is shared by every caller that was
/// coalesced onto it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GreetingsError {
    // Configuration registry errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no greeting service configured for realm '{realm}'")]
    ServiceNotConfigured { realm: String },

    // Secret store errors
    #[error("no active secret '{secret_id}' for realm '{realm}'")]
    NoSuchSecret { realm: String, secret_id: String },

    #[error("secret resolution failed: {0}")]
    SecretResolution(String),

    // Request construction errors
    #[error("invalid request URI: {0}")]
    InvalidUri(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    /// The lookup was cancelled while the request was in flight.
    #[error("interrupted")]
    Interrupted,
}

impl GreetingsError {
    /// Whether the failure happened on the wire (as opposed to configuration
    /// or secret resolution).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GreetingsError::Http(_) | GreetingsError::Timeout | GreetingsError::Interrupted
        )
    }
}

impl From<reqwest::Error> for GreetingsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GreetingsError::Timeout
        } else {
            GreetingsError::Http(err.to_string())
        }
    }
}

// moka hands loader failures back wrapped in an `Arc` so they can be shared
// between waiters.
impl From<Arc<GreetingsError>> for GreetingsError {
    fn from(err: Arc<GreetingsError>) -> Self {
        Arc::unwrap_or_clone(err)
    }
}

/// Result type alias for realm-greetings operations
pub type Result<T> = std::result::Result<T, GreetingsError>;

