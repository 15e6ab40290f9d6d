//! Transaction ledger: the last transaction identifier seen per API key.
//!
//! Each identity owns an async mutex around its identifier. The request engine
//! holds the [`ChainGuard`] from reading the identifier it sends until it has
//! recorded the one it receives, which is what keeps the chain unbroken when
//! several tasks share a client. Identities never wait on each other.

use std::sync::Arc;

use cvclient_api::types::Payload;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Reserved body/response field carrying the transaction identifier.
pub const TX_FIELD: &str = "tx";

#[derive(Default)]
pub struct TransactionLedger {
    chains: DashMap<String, Arc<Mutex<String>>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, identity: &str) -> Arc<Mutex<String>> {
        self.chains.entry(identity.to_string()).or_default().clone()
    }

    /// Waits for exclusive use of the identity's chain.
    pub async fn acquire(&self, identity: &str) -> ChainGuard {
        ChainGuard {
            tx: self.slot(identity).lock_owned().await,
        }
    }

    /// Last identifier recorded for `identity`, or an empty string.
    pub async fn current(&self, identity: &str) -> String {
        self.acquire(identity).await.current().to_string()
    }

    pub async fn record(&self, identity: &str, tx: impl Into<String>) {
        self.acquire(identity).await.record(tx);
    }

    /// Number of identities that have been seen.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Exclusive handle on one identity's transaction chain.
pub struct ChainGuard {
    tx: OwnedMutexGuard<String>,
}

impl ChainGuard {
    pub fn current(&self) -> &str {
        &self.tx
    }

    pub fn record(&mut self, tx: impl Into<String>) {
        *self.tx = tx.into();
    }

    /// Records the payload's `tx` string, if it has one.
    ///
    /// Returns the new identifier. A payload without a usable `tx` leaves the
    /// chain as it was.
    pub fn record_from(&mut self, payload: &Payload) -> Option<&str> {
        match payload.get(TX_FIELD) {
            Some(serde_json::Value::String(tx)) => {
                self.record(tx.as_str());
                Some(self.current())
            }
            _ => None,
        }
    }
}
