//! Chained client: the alerts and chart operations with stamp-validated caching.

use cvclient_api::types::{AlertsRequest, AlertsResponse, ChartResponse, Payload};
use cvclient_api::{HttpTransport, Transport};
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheKind, ResponseCache};
use crate::config::{ClientConfig, Endpoints};
use crate::engine::{to_payload, RequestEngine};
use crate::error::CvClientError;
use crate::oracle::{Freshness, FreshnessOracle};
use crate::params::ChartParams;
use crate::registry::{SessionLease, SessionRegistry};
use crate::request_type::RequestTypes;

/// API client for one API key.
///
/// Every call goes through a status check first; the cached payload is
/// returned when the server's stamp for the request type has not moved since
/// it was stored. Misses are fetched and cached with no eviction.
///
/// Only one client per key can be open in a [`SessionRegistry`]. Calls may be
/// issued from several tasks: exchanges for the key are serialized so the
/// transaction chain stays intact.
pub struct ChainedClient<T = HttpTransport> {
    engine: RequestEngine<T>,
    cache: ResponseCache,
    oracle: FreshnessOracle,
    endpoints: Endpoints,
    request_types: RequestTypes,
    lease: SessionLease,
}

impl ChainedClient<HttpTransport> {
    /// Opens a session over HTTP using the config's TLS and timeout settings.
    pub fn connect(
        config: ClientConfig,
        registry: &SessionRegistry,
    ) -> Result<Self, CvClientError> {
        config.validate()?;
        let transport = HttpTransport::with_timeout(config.verify_tls, config.request_timeout())?;
        Self::with_transport(config, transport, registry)
    }
}

impl<T: Transport> ChainedClient<T> {
    /// Opens a session over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: T,
        registry: &SessionRegistry,
    ) -> Result<Self, CvClientError> {
        config.validate()?;
        let lease = registry.lease(&config.api_key)?;
        let request_types = RequestTypes::new(config.request_types.clone());
        let engine = RequestEngine::new(
            transport,
            &config,
            registry.ledger(),
            lease.cancellation_token(),
        );
        tracing::debug!(
            "Opened session for {} request type(s) against {}",
            config.request_types.len(),
            config.host
        );
        Ok(Self {
            engine,
            cache: ResponseCache::new(request_types.names()),
            oracle: FreshnessOracle::new(config.endpoints.status.clone(), request_types.clone()),
            endpoints: config.endpoints,
            request_types,
            lease,
        })
    }

    /// Fetches the latest alerts for `request_type`, or the cached ones when
    /// the server has nothing newer.
    pub async fn fetch_alerts(&self, request_type: &str) -> Result<AlertsResponse, CvClientError> {
        let payload = self.fetch_alerts_payload(request_type).await?;
        Ok(serde_json::from_value(serde_json::Value::Object(payload))?)
    }

    /// Like [`fetch_alerts`](Self::fetch_alerts) but returns the undecoded payload.
    pub async fn fetch_alerts_payload(&self, request_type: &str) -> Result<Payload, CvClientError> {
        let solver = self.request_types.resolve(request_type)?;
        let body = to_payload(&AlertsRequest {
            alert_type: solver.to_string(),
        })?;
        let key = alerts_cache_key(request_type);
        self.fetch_cached(request_type, CacheKind::Alerts, &key, &self.endpoints.alerts, body)
            .await
    }

    /// Fetches chart data for `params`, or the cached chart for exactly these
    /// parameters when the server has nothing newer.
    pub async fn fetch_chart(&self, params: &ChartParams) -> Result<ChartResponse, CvClientError> {
        let payload = self.fetch_chart_payload(params).await?;
        Ok(serde_json::from_value(serde_json::Value::Object(payload))?)
    }

    /// Like [`fetch_chart`](Self::fetch_chart) but returns the undecoded payload.
    pub async fn fetch_chart_payload(
        &self,
        params: &ChartParams,
    ) -> Result<Payload, CvClientError> {
        let solver = self.request_types.resolve(&params.request_type)?;
        params.validate()?;
        let body = to_payload(&params.to_request(solver))?;
        let key = params.cache_key(solver);
        self.fetch_cached(
            &params.request_type,
            CacheKind::Chart,
            &key,
            &self.endpoints.charts,
            body,
        )
        .await
    }

    /// Runs the freshness check for a cache key without fetching anything.
    pub async fn check_status(
        &self,
        request_type: &str,
        kind: CacheKind,
        key: &str,
    ) -> Result<Freshness, CvClientError> {
        self.oracle
            .check(&self.engine, &self.cache, request_type, kind, key)
            .await
    }

    async fn fetch_cached(
        &self,
        request_type: &str,
        kind: CacheKind,
        key: &str,
        path: &str,
        body: Payload,
    ) -> Result<Payload, CvClientError> {
        match self.check_status(request_type, kind, key).await? {
            Freshness::Fresh(entry) => Ok(entry.payload),
            Freshness::Stale { stamp } => {
                let payload = self.engine.execute(path, body).await?;
                self.cache.put(request_type, kind, key, payload.clone(), stamp);
                Ok(payload)
            }
        }
    }

    pub fn identity(&self) -> &str {
        self.lease.identity()
    }

    /// Last transaction identifier recorded for this client's key.
    pub async fn current_transaction(&self) -> String {
        self.engine.ledger().current(self.identity()).await
    }

    /// Token that aborts in-flight requests and retry waits when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.engine.cancellation_token().clone()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drops every cached payload and stamp.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn transport(&self) -> &T {
        self.engine.transport()
    }
}

pub fn alerts_cache_key(request_type: &str) -> String {
    format!("{}alerts", request_type)
}
