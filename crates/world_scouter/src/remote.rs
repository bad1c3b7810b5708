//! Client for the instance aggregation backend.
//!
//! The backend is a key-value store keyed by world id with two endpoints:
//!
//! - `PUT {base}/world/{world}` stores one observation
//! - `GET {base}/worlds` returns the latest observation of every world
//!
//! [`InstanceInfoService`] never blocks its caller. Requests run on the tokio
//! worker pool and completions are handed to a callback on that pool; it is
//! the caller's job to move them onto the client context.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::config::ApiSettings;
use crate::error::{Result, ScouterError};
use crate::types::{InstanceReport, RawInstanceRecord, WorldId, WorldUpdate};

// ============================================================================
// Backend abstraction
// ============================================================================

/// The two operations the aggregation service supports.
#[async_trait]
pub trait InstanceBackend: Send + Sync + 'static {
    /// Upserts the observation for `world`.
    async fn put_world(&self, world: WorldId, update: WorldUpdate) -> Result<()>;

    /// Reads the full current snapshot.
    async fn fetch_worlds(&self) -> Result<Vec<RawInstanceRecord>>;
}

/// HTTP implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Client for the configured backend, including any developer override.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        Self::new(settings.resolve_base(), settings.request_timeout())
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("world-scouter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn world_url(&self, world: WorldId) -> String {
        format!("{}/world/{}", self.base_url, world)
    }

    fn worlds_url(&self) -> String {
        format!("{}/worlds", self.base_url)
    }
}

#[async_trait]
impl InstanceBackend for HttpBackend {
    async fn put_world(&self, world: WorldId, update: WorldUpdate) -> Result<()> {
        let response = self
            .client
            .put(self.world_url(world))
            .json(&update)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(()),
            code => Err(ScouterError::NetworkStatus(code)),
        }
    }

    async fn fetch_worlds(&self) -> Result<Vec<RawInstanceRecord>> {
        let response = self.client.get(self.worlds_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScouterError::NetworkStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(ScouterError::EmptyBody);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

// ============================================================================
// Non-blocking service
// ============================================================================

/// Fires backend requests without blocking the calling context.
#[derive(Clone)]
pub struct InstanceInfoService {
    backend: Arc<dyn InstanceBackend>,
    runtime: Handle,
}

impl InstanceInfoService {
    pub fn new(backend: Arc<dyn InstanceBackend>, runtime: Handle) -> Self {
        Self { backend, runtime }
    }

    /// Submits one report. Failures are logged and dropped, never retried.
    ///
    /// The returned handle may be ignored; it only exists so callers can wait
    /// for the request in tests or during teardown.
    pub fn submit(&self, report: InstanceReport) -> JoinHandle<Result<()>> {
        let backend = Arc::clone(&self.backend);
        self.runtime.spawn(async move {
            let result = backend.put_world(report.world_id, report.payload()).await;
            match &result {
                Ok(()) => debug!(
                    "Updated world info for world {} (observed at {})",
                    report.world_id, report.timestamp
                ),
                Err(ScouterError::NetworkStatus(code)) => {
                    error!("Unable to update world info (http {})", code)
                }
                Err(e) => error!("Network error submitting world info: {}", e),
            }
            result
        })
    }

    /// Fetches every world's latest record and hands the outcome to
    /// `on_complete` on a worker thread.
    ///
    /// # Arguments
    ///
    /// * `on_complete` - Receives the records, or the transport, status,
    ///   empty-body or decoding error. It runs on the tokio pool, not on the
    ///   client context.
    ///
    /// # Returns
    ///
    /// A handle that resolves once `on_complete` has returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use tokio::runtime::Handle;
    /// use world_scouter::{HttpBackend, InstanceInfoService};
    ///
    /// # async fn fetch() -> world_scouter::Result<()> {
    /// let backend = HttpBackend::new("http://localhost:8000/api/v1", Duration::from_secs(10))?;
    /// let service = InstanceInfoService::new(Arc::new(backend), Handle::current());
    /// service.fetch_all(|result| match result {
    ///     Ok(records) => println!("{} worlds reported", records.len()),
    ///     Err(e) => eprintln!("fetch failed: {}", e),
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn fetch_all<F>(&self, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<RawInstanceRecord>>) + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        self.runtime.spawn(async move {
            let result = backend.fetch_worlds().await;
            match &result {
                Ok(records) => debug!("Fetched {} world records", records.len()),
                Err(e) => error!("Unable to fetch world info: {}", e),
            }
            on_complete(result);
        })
    }
}
