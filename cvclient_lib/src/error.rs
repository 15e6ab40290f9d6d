//! Error types for the library layer.

use std::fmt;
use std::time::Duration;

use crate::config::ConfigError;

/// Errors a caller of [`ChainedClient`](crate::ChainedClient) can observe.
///
/// Connection failures and malformed responses are not here: the request
/// engine retries those until it succeeds, is cancelled, or runs into a
/// configured deadline or attempt ceiling.
#[derive(Debug)]
pub enum CvClientError {
    /// The request type is not one the client was configured with.
    InvalidRequestType(String),
    /// The server answered with an empty body, which is how it rejects a key.
    InvalidApiKey,
    /// The client's cancellation token fired during a request.
    Cancelled,
    /// A single logical request ran past the configured deadline.
    TimedOut(Duration),
    /// The configured attempt ceiling was reached without a usable response.
    RetriesExhausted(u32),
    /// Caller-provided parameters failed validation.
    InvalidInput(String),
    /// A live session already holds this credential.
    SessionActive(String),
    /// The transport could not be constructed.
    Transport(cvclient_api::Error),
    /// A decoded payload did not have the shape of the typed response.
    Payload(serde_json::Error),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for CvClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequestType(name) => write!(f, "No handler for request type: {}", name),
            Self::InvalidApiKey => write!(f, "Connection refused: invalid API key"),
            Self::Cancelled => write!(f, "Request cancelled"),
            Self::TimedOut(d) => write!(f, "Request timed out after {:.1}s", d.as_secs_f64()),
            Self::RetriesExhausted(n) => write!(f, "Request failed after {} attempts", n),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::SessionActive(key) => {
                write!(f, "A session is already open for key {}", redact(key))
            }
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Payload(e) => write!(f, "Unexpected payload: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for CvClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Payload(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<cvclient_api::Error> for CvClientError {
    fn from(e: cvclient_api::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for CvClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Payload(e)
    }
}

impl From<ConfigError> for CvClientError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Keeps the first four characters of a key for log and error output.
pub(crate) fn redact(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}
