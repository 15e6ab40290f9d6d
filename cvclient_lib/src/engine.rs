//! Request engine: one chained request/response exchange, retried until it
//! yields a usable payload.
//!
//! The transaction identifier is read once, when the identity's chain guard is
//! taken, and the same body is resent on every retry. The guard is held until
//! the new identifier has been recorded or the call gives up.

use std::sync::Arc;
use std::time::Duration;

use cvclient_api::types::Payload;
use cvclient_api::{format_url, truncate_body, RawResponse, Transport};
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{redact, CvClientError};
use crate::ledger::{TransactionLedger, TX_FIELD};
use crate::severity::Severity;

/// Why a single attempt produced nothing usable.
#[derive(thiserror::Error, Debug)]
pub(crate) enum Fault {
    #[error("unable to connect to server: {0}")]
    ConnectionFailure(cvclient_api::Error),
    #[error("unable to process response: {0}")]
    MalformedResponse(String),
    #[error("empty response, invalid API key")]
    InvalidApiKey,
}

pub struct RequestEngine<T> {
    transport: T,
    host: String,
    api_key: String,
    ledger: Arc<TransactionLedger>,
    retry: RetryPolicy,
    cancel: CancellationToken,
    chatter: Severity,
}

impl<T: Transport> RequestEngine<T> {
    pub fn new(
        transport: T,
        config: &ClientConfig,
        ledger: Arc<TransactionLedger>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            host: config.host.clone(),
            api_key: config.api_key.clone(),
            ledger,
            retry: config.retry.clone(),
            cancel,
            chatter: Severity::chatter(config.debug),
        }
    }

    pub fn identity(&self) -> &str {
        &self.api_key
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `body` to `path` with the current transaction identifier attached.
    ///
    /// Returns the decoded payload once an attempt succeeds. Fails with
    /// `InvalidApiKey` on an empty body, `Cancelled` when the token fires,
    /// and `TimedOut` / `RetriesExhausted` only when those limits are set.
    pub async fn execute(&self, path: &str, body: Payload) -> Result<Payload, CvClientError> {
        match self.retry.deadline() {
            Some(limit) => tokio::time::timeout(limit, self.run(path, body))
                .await
                .map_err(|_| {
                    tracing::warn!("Request to {} gave up after {:.1}s", path, limit.as_secs_f64());
                    CvClientError::TimedOut(limit)
                })?,
            None => self.run(path, body).await,
        }
    }

    async fn run(&self, path: &str, mut body: Payload) -> Result<Payload, CvClientError> {
        let mut chain = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(CvClientError::Cancelled),
            guard = self.ledger.acquire(&self.api_key) => guard,
        };

        body.insert(
            TX_FIELD.to_string(),
            serde_json::Value::String(chain.current().to_string()),
        );
        self.chatter.emit(format_args!(
            "client sending transaction ID {} for {}",
            chain.current(),
            redact(&self.api_key)
        ));
        let body = serde_json::Value::Object(body);
        let backoff = self.retry.backoff();

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(CvClientError::Cancelled),
                outcome = self.exchange(path, &body) => outcome,
            };

            let fault = match outcome {
                Ok(payload) => {
                    if let Some(tx) = chain.record_from(&payload) {
                        self.chatter
                            .emit(format_args!("client received transaction ID {}", tx));
                    }
                    return Ok(payload);
                }
                Err(Fault::InvalidApiKey) => {
                    tracing::error!("Connection failure, invalid API key");
                    return Err(CvClientError::InvalidApiKey);
                }
                Err(fault) => fault,
            };

            if let Some(max) = self.retry.max_attempts {
                if attempt >= max {
                    tracing::error!(
                        "{} request failed after {} attempts: {}",
                        path,
                        attempt,
                        fault
                    );
                    return Err(CvClientError::RetriesExhausted(attempt));
                }
            }
            tracing::warn!(
                "{} request failed (attempt {}): {}, retrying in {:.1}s",
                path,
                attempt,
                fault,
                backoff.as_secs_f64()
            );
            self.wait(backoff).await?;
        }
    }

    async fn exchange(&self, path: &str, body: &serde_json::Value) -> Result<Payload, Fault> {
        let url = format_url(&self.host, path, &self.api_key).map_err(Fault::ConnectionFailure)?;
        let raw = self
            .transport
            .post(url, body)
            .await
            .map_err(Fault::ConnectionFailure)?;
        decode(&raw)
    }

    async fn wait(&self, backoff: Duration) -> Result<(), CvClientError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CvClientError::Cancelled),
            _ = tokio::time::sleep(backoff) => Ok(()),
        }
    }
}

/// Serializes a request struct into a body the engine can extend.
pub fn to_payload<S: serde::Serialize>(request: &S) -> Result<Payload, CvClientError> {
    match serde_json::to_value(request)? {
        serde_json::Value::Object(payload) => Ok(payload),
        _ => Err(CvClientError::Payload(<serde_json::Error as serde::ser::Error>::custom(
            "request body must serialize to a JSON object",
        ))),
    }
}

/// Interprets a raw body: empty means a rejected key, anything that is not a
/// JSON object is malformed.
pub(crate) fn decode(raw: &RawResponse) -> Result<Payload, Fault> {
    if raw.is_empty() {
        return Err(Fault::InvalidApiKey);
    }
    match serde_json::from_str::<serde_json::Value>(&raw.body) {
        Ok(serde_json::Value::Object(payload)) => Ok(payload),
        Ok(other) => Err(Fault::MalformedResponse(format!(
            "expected a JSON object (status {}), got: {}",
            raw.status,
            truncate_body(&other.to_string())
        ))),
        Err(e) => Err(Fault::MalformedResponse(format!(
            "{} (status {}) | body: {}",
            e,
            raw.status,
            truncate_body(&raw.body)
        ))),
    }
}
