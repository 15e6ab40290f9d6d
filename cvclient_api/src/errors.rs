//! Error types for the transport layer.

/// Connection-level failures raised by a [`Transport`](crate::Transport).
///
/// None of these mean the server answered: a response that arrived, however
/// malformed, is returned as a [`RawResponse`](crate::RawResponse).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request URL could not be built from the host and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed (TLS backend, proxy settings).
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    /// The server could not be reached or the exchange did not complete.
    #[error("Connection failed: {0}")]
    Connection(String),
    /// The response body could not be read off the wire.
    #[error("Failed to read response body: {0}")]
    Body(String),
}
