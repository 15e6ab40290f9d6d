//! Session registry: at most one live client per API key.
//!
//! Two clients sharing a key would interleave their transaction chains, so the
//! registry refuses the second one. The registry also owns the transaction
//! ledger, which means a client opened after an earlier one was dropped picks
//! up the chain where it stopped.

use std::sync::Arc;

use dashmap::DashSet;
use tokio_util::sync::CancellationToken;

use crate::error::CvClientError;
use crate::ledger::TransactionLedger;

/// Cloneable handle; clones share the same sessions and ledger.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    live: Arc<DashSet<String>>,
    ledger: Arc<TransactionLedger>,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `identity` for a new session.
    pub fn lease(&self, identity: &str) -> Result<SessionLease, CvClientError> {
        if !self.live.insert(identity.to_string()) {
            tracing::error!("Refusing second session for the same API key");
            return Err(CvClientError::SessionActive(identity.to_string()));
        }
        Ok(SessionLease {
            identity: identity.to_string(),
            live: Arc::clone(&self.live),
            cancel: self.shutdown.child_token(),
        })
    }

    pub fn is_live(&self, identity: &str) -> bool {
        self.live.contains(identity)
    }

    pub fn ledger(&self) -> Arc<TransactionLedger> {
        Arc::clone(&self.ledger)
    }

    /// Cancels every session leased from this registry.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Proof that a session owns its identity. Releases the identity on drop.
pub struct SessionLease {
    identity: String,
    live: Arc<DashSet<String>>,
    cancel: CancellationToken,
}

impl SessionLease {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Token cancelled by [`SessionRegistry::shutdown`] or by the session itself.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.live.remove(&self.identity);
    }
}
