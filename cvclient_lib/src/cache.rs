//! Per-request-type response cache backed by `DashMap` for concurrent access.
//!
//! Each request type owns a bucket with the freshness stamp last observed for
//! that type and separate alert and chart entry maps. Buckets exist for every
//! configured request type from construction on; there is no eviction.

use std::collections::HashMap;
use std::time::Duration;

use cvclient_api::types::Payload;
use dashmap::DashMap;
use tokio::time::Instant;

/// Which of a bucket's entry maps a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Alerts,
    Chart,
}

/// A cached payload and the freshness stamp that was current when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: Payload,
    pub stamp: Option<String>,
    pub stored_at: Instant,
}

impl CacheEntry {
    /// An entry is only valid for the data generation it was fetched under.
    pub fn is_current(&self, observed: &str) -> bool {
        self.stamp.as_deref() == Some(observed)
    }

    /// Time since the entry was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

#[derive(Default)]
struct Bucket {
    stamp: Option<String>,
    alerts: HashMap<String, CacheEntry>,
    charts: HashMap<String, CacheEntry>,
}

impl Bucket {
    fn entries(&self, kind: CacheKind) -> &HashMap<String, CacheEntry> {
        match kind {
            CacheKind::Alerts => &self.alerts,
            CacheKind::Chart => &self.charts,
        }
    }

    fn entries_mut(&mut self, kind: CacheKind) -> &mut HashMap<String, CacheEntry> {
        match kind {
            CacheKind::Alerts => &mut self.alerts,
            CacheKind::Chart => &mut self.charts,
        }
    }
}

/// Thread-safe cache of decoded responses, partitioned by request type.
///
/// Operations on a request type without a bucket are no-ops returning `None`;
/// callers validate the request type before reaching the cache.
pub struct ResponseCache {
    buckets: DashMap<String, Bucket>,
}

impl ResponseCache {
    /// Creates an empty bucket for every request type.
    pub fn new<I, S>(request_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buckets = DashMap::new();
        for name in request_types {
            buckets.insert(name.into(), Bucket::default());
        }
        Self { buckets }
    }

    pub fn has_bucket(&self, request_type: &str) -> bool {
        self.buckets.contains_key(request_type)
    }

    /// Returns a copy of the entry for `key`, if one was stored.
    pub fn get(&self, request_type: &str, kind: CacheKind, key: &str) -> Option<CacheEntry> {
        let bucket = self.buckets.get(request_type)?;
        bucket.entries(kind).get(key).cloned()
    }

    /// Inserts or overwrites an entry, tagging it with the stamp it was fetched under.
    pub fn put(
        &self,
        request_type: &str,
        kind: CacheKind,
        key: impl Into<String>,
        payload: Payload,
        stamp: Option<String>,
    ) {
        if let Some(mut bucket) = self.buckets.get_mut(request_type) {
            bucket.entries_mut(kind).insert(
                key.into(),
                CacheEntry {
                    payload,
                    stamp,
                    stored_at: Instant::now(),
                },
            );
        } else {
            tracing::warn!("No cache bucket for request type {}", request_type);
        }
    }

    /// The freshness stamp last observed for `request_type`.
    pub fn stamp(&self, request_type: &str) -> Option<String> {
        self.buckets.get(request_type)?.stamp.clone()
    }

    pub fn set_stamp(&self, request_type: &str, stamp: Option<String>) {
        if let Some(mut bucket) = self.buckets.get_mut(request_type) {
            bucket.stamp = stamp;
        }
    }

    /// Number of entries stored for a request type across both kinds.
    pub fn len(&self, request_type: &str) -> usize {
        self.buckets
            .get(request_type)
            .map(|b| b.alerts.len() + b.charts.len())
            .unwrap_or(0)
    }

    /// Drops all entries and stamps, keeping the buckets.
    pub fn clear(&self) {
        for mut bucket in self.buckets.iter_mut() {
            *bucket = Bucket::default();
        }
    }
}
