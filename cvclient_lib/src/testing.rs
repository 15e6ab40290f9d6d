//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use cvclient_api::{Error, RawResponse, Transport};
use url::Url;

/// Plays back a fixed sequence of outcomes and records every request.
///
/// Once the script runs out, every further call fails to connect.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, Error>>>,
    sent: Mutex<Vec<(Url, serde_json::Value)>>,
}

impl ScriptedTransport {
    pub(crate) fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<RawResponse, Error>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<(Url, serde_json::Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The `tx` values sent, in order.
    pub(crate) fn sent_tx(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|(_, body)| body["tx"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, url: Url, body: &serde_json::Value) -> Result<RawResponse, Error> {
        self.sent.lock().unwrap().push((url, body.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(down)
    }
}

pub(crate) fn ok(body: serde_json::Value) -> Result<RawResponse, Error> {
    Ok(RawResponse::new(200, body.to_string()))
}

pub(crate) fn raw(body: &str) -> Result<RawResponse, Error> {
    Ok(RawResponse::new(200, body))
}

pub(crate) fn down() -> Result<RawResponse, Error> {
    Err(Error::Connection("connection refused".to_string()))
}
