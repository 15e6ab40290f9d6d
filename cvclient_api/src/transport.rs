//! The seam between the chaining client and whatever moves bytes.

use std::future::Future;

use url::Url;

use crate::Error;

/// A response that made it back from the server, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The service answers a bad key with an empty body rather than a status code.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Performs a single JSON POST.
///
/// Implementations report only connection-level problems as errors. Any
/// response the server actually sent, whatever its status, comes back as
/// `Ok` so the caller can decide what the body means.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}
