//! The earthquake list and the pipeline that refreshes it.
//!
//! A load runs: `Refreshing` event → GET on the selected endpoint → lenient
//! decode into a fresh list → swap the stored list → `Loaded` event. Failures
//! are logged and swallowed; the previous list stays in place and no `Loaded`
//! is sent.
//!
//! Overlapping loads are resolved by generation: every `load()` takes a new
//! generation number when it starts, and only the newest generation may
//! commit. A slower, older load that finishes afterwards is dropped as
//! superseded instead of overwriting fresher data.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use quake_common::{Endpoint, QuakeError};
use quake_config::QuakeConfig;
use quake_http::{HttpClient, HttpError, Url};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::decode::{decode_feed, FeedError};
use crate::model::Earthquake;
use crate::source::FeedSource;

const EVENT_CAPACITY: usize = 16;

/// Lifecycle signals for observers. Neither carries data; re-read
/// [`QuakeLoader::earthquakes`] after `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderEvent {
    Refreshing,
    Loaded,
}

/// What a single `load()` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed,
    Superseded,
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// Connection or transport failure.
    #[error("network: {0}")]
    Network(#[source] HttpError),
    /// Non-2xx status, undecodable body, or a body that is not an array.
    #[error("validation: {0}")]
    Validation(String),
}

impl From<HttpError> for LoadError {
    fn from(err: HttpError) -> Self {
        if err.is_transport() {
            LoadError::Network(err)
        } else {
            LoadError::Validation(err.to_string())
        }
    }
}

impl From<FeedError> for LoadError {
    fn from(err: FeedError) -> Self {
        LoadError::Validation(err.to_string())
    }
}

/// The two fixed feed URLs, validated up front.
#[derive(Debug, Clone)]
pub struct Endpoints {
    small: Url,
    large: Url,
}

impl Endpoints {
    /// ```
    /// use quake_core::{Endpoint, Endpoints};
    ///
    /// let endpoints = Endpoints::new("https://a.example/s.json", "https://b.example/l.json")?;
    /// assert_eq!(endpoints.url(Endpoint::Large).host_str(), Some("b.example"));
    /// assert!(Endpoints::new("not a url", "https://b.example/l.json").is_err());
    /// # Ok::<(), quake_common::QuakeError>(())
    /// ```
    pub fn new(small: &str, large: &str) -> quake_common::Result<Self> {
        Ok(Self {
            small: parse_endpoint(Endpoint::Small, small)?,
            large: parse_endpoint(Endpoint::Large, large)?,
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Small => &self.small,
            Endpoint::Large => &self.large,
        }
    }
}

fn parse_endpoint(endpoint: Endpoint, raw: &str) -> quake_common::Result<Url> {
    Url::parse(raw)
        .map_err(|e| QuakeError::Config(format!("invalid {endpoint} endpoint {raw:?}: {e}")))
}

pub struct QuakeLoader {
    source: Arc<dyn FeedSource>,
    endpoints: Endpoints,
    use_large: AtomicBool,
    generation: AtomicU64,
    earthquakes: RwLock<Arc<[Earthquake]>>,
    events: broadcast::Sender<LoaderEvent>,
}

impl QuakeLoader {
    /// Build a loader over any feed source, starting on the small endpoint
    /// with an empty list.
    pub fn new(source: Arc<dyn FeedSource>, endpoints: Endpoints) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            endpoints,
            use_large: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            earthquakes: RwLock::new(Arc::from(Vec::new())),
            events,
        }
    }

    /// Build an HTTP-backed loader from configuration.
    pub fn from_config(cfg: &QuakeConfig) -> quake_common::Result<Self> {
        let endpoints = Endpoints::new(&cfg.endpoints.small, &cfg.endpoints.large)?;
        let http = HttpClient::new()
            .map_err(|e| QuakeError::Transport(e.to_string()))?
            .with_timeout(cfg.timeout());
        Ok(Self::new(Arc::new(http), endpoints)
            .with_endpoint(Endpoint::from_use_large(cfg.use_large)))
    }

    /// Select the starting endpoint without triggering a load.
    pub fn with_endpoint(self, endpoint: Endpoint) -> Self {
        self.use_large.store(endpoint.is_large(), Ordering::SeqCst);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_use_large(self.use_large.load(Ordering::SeqCst))
    }

    pub fn is_using_large_endpoint(&self) -> bool {
        self.endpoint().is_large()
    }

    pub fn current_url(&self) -> &Url {
        self.endpoints.url(self.endpoint())
    }

    /// Snapshot of the current list. Cheap; the list itself is never mutated.
    pub async fn earthquakes(&self) -> Arc<[Earthquake]> {
        self.earthquakes.read().await.clone()
    }

    /// Switch feeds and reload from the newly selected one.
    pub async fn set_endpoint(&self, use_large: bool) -> LoadOutcome {
        let endpoint = Endpoint::from_use_large(use_large);
        self.use_large.store(use_large, Ordering::SeqCst);
        tracing::info!(%endpoint, "quake.endpoint.selected");
        self.load().await
    }

    /// Refresh the list from the current endpoint. Never returns an error:
    /// failures are logged and leave the previous list in place.
    pub async fn load(&self) -> LoadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let endpoint = self.endpoint();
        let started = Instant::now();

        let _ = self.events.send(LoaderEvent::Refreshing);
        tracing::info!(
            %endpoint,
            url = %self.endpoints.url(endpoint),
            generation,
            "quake.load.start"
        );

        let fresh = match self.fetch_earthquakes(endpoint).await {
            Ok(fresh) => fresh,
            Err(err) => {
                tracing::warn!(%endpoint, generation, error = %err, "quake.load.failed");
                return LoadOutcome::Failed;
            }
        };
        let count = fresh.len();

        let mut current = self.earthquakes.write().await;
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            tracing::info!(%endpoint, generation, latest, count, "quake.load.superseded");
            return LoadOutcome::Superseded;
        }
        *current = Arc::from(fresh);
        let _ = self.events.send(LoaderEvent::Loaded);
        drop(current);

        tracing::info!(
            %endpoint,
            generation,
            count,
            duration_ms = started.elapsed().as_millis() as u64,
            "quake.load.done"
        );
        LoadOutcome::Loaded { count }
    }

    /// Fetch and decode one endpoint without touching the stored list.
    pub async fn fetch_earthquakes(&self, endpoint: Endpoint) -> Result<Vec<Earthquake>, LoadError> {
        let body = self.source.fetch(self.endpoints.url(endpoint).as_str()).await?;
        Ok(decode_feed(&body)?)
    }

    /// Run [`load`](Self::load) on the tokio runtime without waiting for it.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<LoadOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.load().await })
    }

    /// Run [`set_endpoint`](Self::set_endpoint) on the tokio runtime without waiting for it.
    pub fn spawn_set_endpoint(self: &Arc<Self>, use_large: bool) -> JoinHandle<LoadOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.set_endpoint(use_large).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::sync::{broadcast::error::TryRecvError, oneshot, Mutex, Notify};

    const SMALL: &str = "http://feeds.test/small.json";
    const LARGE: &str = "http://feeds.test/large.json";

    fn endpoints() -> Endpoints {
        Endpoints::new(SMALL, LARGE).unwrap()
    }

    /// Serves fixed bodies; unknown URLs fail like a refused connection.
    struct CannedSource {
        bodies: HashMap<String, Value>,
    }

    #[async_trait]
    impl FeedSource for CannedSource {
        async fn fetch(&self, url: &str) -> Result<Value, HttpError> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| HttpError::Network(format!("connection refused: {url}")))
        }
    }

    /// Holds the first small-feed fetch until the gate is opened.
    struct GatedSource {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        entered: Notify,
        inner: CannedSource,
    }

    #[async_trait]
    impl FeedSource for GatedSource {
        async fn fetch(&self, url: &str) -> Result<Value, HttpError> {
            if url == SMALL {
                let gate = self.gate.lock().await.take();
                if let Some(gate) = gate {
                    self.entered.notify_one();
                    let _ = gate.await;
                }
            }
            self.inner.fetch(url).await
        }
    }

    fn canned() -> CannedSource {
        CannedSource {
            bodies: HashMap::from([
                (SMALL.to_string(), json!([{"id": 1}, {"id": 2}])),
                (LARGE.to_string(), json!([{"id": 10}, {"id": 11}, {"id": 12}])),
            ]),
        }
    }

    fn ids(list: &[Earthquake]) -> Vec<i64> {
        list.iter().map(Earthquake::id).collect()
    }

    #[tokio::test]
    async fn starts_empty_on_small_endpoint() {
        let loader = QuakeLoader::new(Arc::new(canned()), endpoints());
        assert!(!loader.is_using_large_endpoint());
        assert_eq!(loader.current_url().as_str(), SMALL);
        assert!(loader.earthquakes().await.is_empty());
    }

    #[tokio::test]
    async fn load_replaces_list_and_signals() {
        let loader = QuakeLoader::new(Arc::new(canned()), endpoints());
        let mut rx = loader.subscribe();

        assert_eq!(loader.load().await, LoadOutcome::Loaded { count: 2 });
        assert_eq!(ids(&loader.earthquakes().await), vec![1, 2]);
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Refreshing));
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Loaded));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn with_endpoint_does_not_load() {
        let loader = QuakeLoader::new(Arc::new(canned()), endpoints()).with_endpoint(Endpoint::Large);
        assert!(loader.is_using_large_endpoint());
        assert!(loader.earthquakes().await.is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_previous_list() {
        let source = CannedSource {
            bodies: HashMap::from([(SMALL.to_string(), json!([{"id": 5}]))]),
        };
        let loader = QuakeLoader::new(Arc::new(source), endpoints());
        loader.load().await;

        let mut rx = loader.subscribe();
        assert_eq!(loader.set_endpoint(true).await, LoadOutcome::Failed);
        assert!(loader.is_using_large_endpoint());
        assert_eq!(ids(&loader.earthquakes().await), vec![5]);
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Refreshing));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn stale_load_is_superseded() {
        let (open, gate) = oneshot::channel();
        let source = Arc::new(GatedSource {
            gate: Mutex::new(Some(gate)),
            entered: Notify::new(),
            inner: canned(),
        });
        let loader = Arc::new(QuakeLoader::new(source.clone(), endpoints()));
        let mut rx = loader.subscribe();

        let slow = loader.spawn_load();
        source.entered.notified().await;

        assert_eq!(loader.set_endpoint(true).await, LoadOutcome::Loaded { count: 3 });
        open.send(()).unwrap();
        assert_eq!(slow.await.unwrap(), LoadOutcome::Superseded);

        assert_eq!(ids(&loader.earthquakes().await), vec![10, 11, 12]);
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Refreshing));
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Refreshing));
        assert_eq!(rx.try_recv(), Ok(LoaderEvent::Loaded));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn http_errors_split_into_network_and_validation() {
        let network = LoadError::from(HttpError::Network("refused".into()));
        assert!(matches!(network, LoadError::Network(_)));

        let status = LoadError::from(HttpError::Api {
            status: quake_http::StatusCode::NOT_FOUND,
            message: "missing".into(),
            request_id: "-".into(),
        });
        assert!(matches!(status, LoadError::Validation(_)));

        let decode = LoadError::from(HttpError::Decode("eof".into(), String::new()));
        assert!(matches!(decode, LoadError::Validation(_)));
    }
}
