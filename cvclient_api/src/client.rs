//! reqwest-backed transport for the alerting service.

use std::time::Duration;

use url::Url;

use crate::{transport::RawResponse, Error, Transport};

/// Default per-exchange timeout. A timed-out exchange is a connection failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds `<host><path>?key=<api_key>`.
///
/// The host is used verbatim as a prefix, so `https://srv:5000` and
/// `https://srv:5000/` + `/client/alerts` behave the way a reader would expect
/// from string concatenation once the URL is normalized.
pub fn format_url(host: &str, path: &str, api_key: &str) -> Result<Url, Error> {
    let joined = format!("{}{}", host.trim_end_matches('/'), path);
    let mut url = Url::parse(&joined).map_err(|e| {
        tracing::error!("Invalid URL constructed: {}", e);
        Error::InvalidUrl(format!("{}: {}", joined, e))
    })?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

/// HTTP transport sending JSON POST requests.
///
/// Certificate verification is a caller decision: the service currently runs
/// behind self-signed certificates, so `verify_tls = false` is the usual
/// setting.
pub struct HttpTransport {
    client: reqwest::Client,
    verify_tls: bool,
}

impl HttpTransport {
    /// Creates a transport with the default timeout.
    pub fn new(verify_tls: bool) -> Result<Self, Error> {
        Self::with_timeout(verify_tls, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom per-exchange timeout.
    pub fn with_timeout(verify_tls: bool, timeout: Duration) -> Result<Self, Error> {
        if !verify_tls {
            tracing::warn!("TLS certificate verification is disabled");
        }
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::ClientBuild(e.to_string())
            })?;
        Ok(Self { client, verify_tls })
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

impl Transport for HttpTransport {
    async fn post(&self, url: Url, body: &serde_json::Value) -> Result<RawResponse, Error> {
        let resp = self
            .client
            .post(url)
            .header("accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the URL, which carries the key.
                let e = e.without_url();
                tracing::debug!("POST failed: {}", e);
                Error::Connection(e.to_string())
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            let e = e.without_url();
            tracing::debug!("Failed to read response body: {}", e);
            Error::Body(e.to_string())
        })?;

        if !status.is_success() {
            tracing::debug!(
                "Server answered with status {}: {}",
                status,
                truncate_body(&text)
            );
        }

        Ok(RawResponse::new(status.as_u16(), text))
    }
}

/// Shortens a body for log lines.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_url_appends_key() {
        let url = format_url("https://127.0.0.1:5000", "/client/alerts", "abc").unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1:5000/client/alerts?key=abc");
    }

    #[test]
    fn format_url_tolerates_trailing_slash() {
        let url = format_url("http://localhost:8080/", "/client/status", "k").unwrap();
        assert_eq!(url.path(), "/client/status");
        assert_eq!(url.query(), Some("key=k"));
    }

    #[test]
    fn format_url_encodes_key() {
        let url = format_url("http://localhost", "/client/status", "a b&c").unwrap();
        let key: Vec<_> = url.query_pairs().collect();
        assert_eq!(key.len(), 1);
        assert_eq!(key[0].1, "a b&c");
    }

    #[test]
    fn format_url_rejects_garbage_host() {
        let err = format_url("not a host", "/client/status", "k").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(2500);
        assert!(truncate_body(&long).ends_with("...[truncated]"));
    }
}
