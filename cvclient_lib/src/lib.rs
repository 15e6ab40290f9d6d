//! Library layer for cvclient: transaction-chained API client with
//! stamp-validated caching.
//!
//! Wraps the `cvclient_api` transport with a per-key transaction ledger, a
//! retrying request engine, a freshness oracle and a per-request-type
//! response cache.

pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod params;
pub mod registry;
pub mod request_type;
pub mod severity;

#[cfg(test)]
mod testing;

pub use cvclient_api;
pub use cvclient_api::types;

pub use cache::{CacheEntry, CacheKind, ResponseCache};
pub use client::ChainedClient;
pub use config::{ClientConfig, ConfigError, Endpoints, RetryPolicy};
pub use engine::RequestEngine;
pub use error::CvClientError;
pub use ledger::{ChainGuard, TransactionLedger};
pub use oracle::{Freshness, FreshnessOracle};
pub use params::ChartParams;
pub use registry::{SessionLease, SessionRegistry};
pub use request_type::RequestTypes;
pub use severity::Severity;
