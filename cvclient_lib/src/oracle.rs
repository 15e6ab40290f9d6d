//! Freshness oracle: one status check decides whether a cache entry is usable.

use cvclient_api::types::{Payload, StatusRequest, StatusResponse};
use cvclient_api::Transport;

use crate::cache::{CacheEntry, CacheKind, ResponseCache};
use crate::engine::{to_payload, RequestEngine};
use crate::error::CvClientError;
use crate::request_type::RequestTypes;

/// Outcome of a freshness check.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    /// The cached entry belongs to the generation the server is serving now.
    Fresh(CacheEntry),
    /// Refetch required. `stamp` is what the status check reported, if
    /// anything; the refetched entry should be stored under it.
    Stale { stamp: Option<String> },
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh(_))
    }
}

pub struct FreshnessOracle {
    status_path: String,
    request_types: RequestTypes,
}

impl FreshnessOracle {
    pub fn new(status_path: impl Into<String>, request_types: RequestTypes) -> Self {
        Self {
            status_path: status_path.into(),
            request_types,
        }
    }

    /// Asks the server for the current stamp of `request_type` and compares it
    /// with what the cache holds for `key`.
    ///
    /// Stale when the stamp moved, when nothing is cached for `key`, or when
    /// the status response carried no stamp at all. On a stale verdict with a
    /// stamp, the type's remembered stamp is updated before returning.
    pub async fn check<T: Transport>(
        &self,
        engine: &RequestEngine<T>,
        cache: &ResponseCache,
        request_type: &str,
        kind: CacheKind,
        key: &str,
    ) -> Result<Freshness, CvClientError> {
        let solver = self.request_types.resolve(request_type)?;
        let body = to_payload(&StatusRequest {
            status_type: solver.to_string(),
        })?;
        tracing::debug!("Checking {} cache key {}", request_type, key);

        let response = engine.execute(&self.status_path, body).await?;
        let Some(stamp) = extract_stamp(&response) else {
            tracing::warn!(
                "Status response for {} has no stamp, refetching",
                request_type
            );
            return Ok(Freshness::Stale { stamp: None });
        };

        let remembered = cache.stamp(request_type);
        let entry = cache
            .get(request_type, kind, key)
            .filter(|entry| entry.is_current(&stamp));

        match entry {
            Some(entry) if remembered.as_deref() == Some(stamp.as_str()) => {
                tracing::debug!(
                    "Cache hit for {} (stamp {}, stored {:.1}s ago)",
                    key,
                    stamp,
                    entry.age().as_secs_f64()
                );
                Ok(Freshness::Fresh(entry))
            }
            _ => {
                tracing::debug!(
                    "Cache stale for {}: local {:?}, remote {}",
                    key,
                    remembered,
                    stamp
                );
                cache.set_stamp(request_type, Some(stamp.clone()));
                Ok(Freshness::Stale { stamp: Some(stamp) })
            }
        }
    }
}

/// Reads the freshness stamp from a status payload. Non-string scalars are
/// kept in their JSON form; `null` counts as missing.
fn extract_stamp(payload: &Payload) -> Option<String> {
    StatusResponse::from_payload(payload).ok()?.stamp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::ledger::TransactionLedger;
    use crate::testing::{ok, ScriptedTransport};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    type Fixture = (RequestEngine<ScriptedTransport>, ResponseCache, FreshnessOracle);

    fn setup(script: ScriptedTransport) -> Fixture {
        let config = ClientConfig::new("https://srv", "key-1");
        let engine = RequestEngine::new(
            script,
            &config,
            Arc::new(TransactionLedger::new()),
            CancellationToken::new(),
        );
        let types = RequestTypes::new(BTreeMap::from([(
            "aaa".to_string(),
            "aaa_floating".to_string(),
        )]));
        (
            engine,
            ResponseCache::new(["aaa"]),
            FreshnessOracle::new("/client/status", types),
        )
    }

    #[test]
    fn extract_stamp_variants() {
        let p = |v: serde_json::Value| v.as_object().cloned().unwrap();
        assert_eq!(extract_stamp(&p(json!({"stamp": "s1"}))).as_deref(), Some("s1"));
        assert_eq!(extract_stamp(&p(json!({"stamp": 42}))).as_deref(), Some("42"));
        assert_eq!(extract_stamp(&p(json!({"stamp": null}))), None);
        assert_eq!(extract_stamp(&p(json!({}))), None);
    }

    #[tokio::test]
    async fn unknown_type_sends_nothing() {
        let (engine, cache, oracle) = setup(ScriptedTransport::new([]));
        let err = oracle
            .check(&engine, &cache, "zzz", CacheKind::Alerts, "zzzalerts")
            .await
            .unwrap_err();
        assert!(matches!(err, CvClientError::InvalidRequestType(_)));
        assert_eq!(engine.transport().calls(), 0);
    }

    #[tokio::test]
    async fn status_body_names_the_solver() {
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "stamp": "s1"}))]));
        oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        let sent = engine.transport().sent();
        assert_eq!(sent[0].0.path(), "/client/status");
        assert_eq!(sent[0].1, json!({"status_type": "aaa_floating", "tx": ""}));
    }

    #[tokio::test]
    async fn empty_cache_is_stale_and_remembers_stamp() {
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "stamp": "s1"}))]));
        let verdict = oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        assert_eq!(verdict, Freshness::Stale { stamp: Some("s1".into()) });
        assert_eq!(cache.stamp("aaa").as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn matching_stamp_is_fresh() {
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "stamp": "s1"}))]));
        cache.set_stamp("aaa", Some("s1".into()));
        cache.put("aaa", CacheKind::Alerts, "aaaalerts", Payload::new(), Some("s1".into()));

        let verdict = oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        assert!(verdict.is_fresh());
    }

    #[tokio::test]
    async fn moved_stamp_is_stale() {
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "stamp": "s2"}))]));
        cache.set_stamp("aaa", Some("s1".into()));
        cache.put("aaa", CacheKind::Alerts, "aaaalerts", Payload::new(), Some("s1".into()));

        let verdict = oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        assert_eq!(verdict, Freshness::Stale { stamp: Some("s2".into()) });
        assert_eq!(cache.stamp("aaa").as_deref(), Some("s2"));
    }

    #[tokio::test]
    async fn entry_from_older_generation_is_stale_even_if_type_stamp_matches() {
        // Another key under the same type already observed s2.
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "stamp": "s2"}))]));
        cache.set_stamp("aaa", Some("s2".into()));
        cache.put("aaa", CacheKind::Alerts, "aaaalerts", Payload::new(), Some("s1".into()));

        let verdict = oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        assert!(!verdict.is_fresh());
    }

    #[tokio::test]
    async fn missing_stamp_is_stale_and_keeps_remembered() {
        let (engine, cache, oracle) =
            setup(ScriptedTransport::new([ok(json!({"tx": "t1", "msg": "busy"}))]));
        cache.set_stamp("aaa", Some("s1".into()));
        cache.put("aaa", CacheKind::Alerts, "aaaalerts", Payload::new(), Some("s1".into()));

        let verdict = oracle
            .check(&engine, &cache, "aaa", CacheKind::Alerts, "aaaalerts")
            .await
            .unwrap();
        assert_eq!(verdict, Freshness::Stale { stamp: None });
        assert_eq!(cache.stamp("aaa").as_deref(), Some("s1"));
    }
}
