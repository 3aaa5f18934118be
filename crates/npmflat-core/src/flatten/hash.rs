//! Tarball content hashing.
//!
//! Only `https` registry URLs are hashed. Everything else (git remotes,
//! local files, plain http) resolves to `None` with a warning.

use super::error::FlattenError;
use super::resolve::ResourceRecord;
use crate::version::USER_AGENT;
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use npmflat_util::hash::Sha256Hex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default maximum number of concurrent hash fetches.
pub const MAX_CONCURRENT_FETCHES: usize = 16;

/// Scheme a URL must use to be hashed.
pub const QUALIFYING_SCHEME: &str = "https";

/// Per-request timeout in seconds.
const FETCH_TIMEOUT_SECS: u64 = 120;

/// Computes SHA-256 digests of remote tarballs.
#[derive(Debug, Clone)]
pub struct HashFetcher {
    http: Client,
    max_concurrent: usize,
}

impl HashFetcher {
    /// Create a fetcher with its own HTTP client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, FlattenError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_client(http))
    }

    /// Create a fetcher reusing an existing client.
    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            max_concurrent: MAX_CONCURRENT_FETCHES,
        }
    }

    /// Set the maximum number of fetches in flight.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Hash the content behind `url`.
    ///
    /// Returns `Ok(None)` when there is no URL or the URL is not `https`.
    ///
    /// # Errors
    /// Returns `HASH_FETCH_FAILED` if the request or the body stream fails.
    pub async fn sha256(&self, url: Option<&str>) -> Result<Option<String>, FlattenError> {
        let Some(url) = url else {
            return Ok(None);
        };

        if !is_qualifying(url) {
            warn!(url, "only https registry URLs are hashed; leaving sha256 empty");
            return Ok(None);
        }

        self.digest(url).await.map(Some)
    }

    /// Stream the body behind `url` through SHA-256.
    async fn digest(&self, url: &str) -> Result<String, FlattenError> {
        let mut response = self.http.get(url).send().await?.error_for_status()?;

        let mut hasher = Sha256Hex::new();
        while let Some(chunk) = response.chunk().await? {
            hasher.update(&chunk);
        }

        debug!(url, bytes = hasher.len(), "hashed tarball");
        Ok(hasher.finish())
    }

    /// Hash every resource's URL concurrently and store the digests.
    ///
    /// All-or-nothing: the first failure to arrive cancels the fetches still
    /// in flight and no record is updated.
    ///
    /// # Errors
    /// Returns the first `HASH_FETCH_FAILED` error encountered.
    pub async fn fill_hashes(
        &self,
        resources: &mut IndexMap<String, ResourceRecord>,
    ) -> Result<(), FlattenError> {
        let jobs: Vec<(String, String)> = resources
            .iter()
            .map(|(id, record)| (id.clone(), record.url.clone()))
            .collect();

        let hashes: Vec<(String, Option<String>)> = stream::iter(jobs)
            .map(|(id, url)| async move {
                let hash = self.sha256(Some(&url)).await?;
                Ok::<_, FlattenError>((id, hash))
            })
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;

        for (id, hash) in hashes {
            if let Some(record) = resources.get_mut(&id) {
                record.sha256 = hash;
            }
        }

        Ok(())
    }
}

/// Whether a URL is eligible for hashing.
#[must_use]
pub fn is_qualifying(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| u.scheme() == QUALIFYING_SCHEME)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::flatten::error::codes;
    use axum::{http::StatusCode, routing::get, Router};
    use npmflat_util::hash::sha256_bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    const TARBALL: &[u8] = b"\x1f\x8bfake tarball content for hashing";

    /// Serve a fixed tarball on an ephemeral port, returning the base URL.
    async fn serve_tarball() -> String {
        let app = Router::new()
            .route("/pkg/-/pkg-1.0.0.tgz", get(|| async { TARBALL.to_vec() }))
            .route("/missing.tgz", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Counts WARN events.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Count WARN events on the current thread until the guard drops.
    pub(crate) fn count_warnings() -> (Arc<AtomicUsize>, DefaultGuard) {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        (warnings, tracing::subscriber::set_default(subscriber))
    }

    /// Accept connections on an ephemeral port and never answer them.
    async fn serve_silence() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    /// An address nothing listens on.
    async fn closed_addr() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    fn record(url: &str) -> ResourceRecord {
        ResourceRecord {
            name: "pkg".to_string(),
            url: url.to_string(),
            is_nested: false,
            parents: Vec::new(),
            bin_mappings: None,
            install_command: None,
            sha256: None,
            pending_parents: Vec::new(),
        }
    }

    #[test]
    fn test_is_qualifying() {
        assert!(is_qualifying("https://registry.example/pkg/-/pkg-1.0.0.tgz"));
        assert!(!is_qualifying("http://registry.example/pkg/-/pkg-1.0.0.tgz"));
        assert!(!is_qualifying("git+ssh://example.com/pkg.git"));
        assert!(!is_qualifying("file:../local"));
        assert!(!is_qualifying("not a url"));
    }

    #[tokio::test]
    async fn test_absent_url_is_none() {
        let fetcher = HashFetcher::new().unwrap();
        assert_eq!(fetcher.sha256(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_https_url_warns_once() {
        let (warnings, _guard) = count_warnings();

        let fetcher = HashFetcher::new().unwrap();
        let hash = fetcher
            .sha256(Some("git+ssh://example.com/pkg.git"))
            .await
            .unwrap();

        assert_eq!(hash, None);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_digest_is_deterministic() {
        let base = serve_tarball().await;
        let url = format!("{base}/pkg/-/pkg-1.0.0.tgz");
        let fetcher = HashFetcher::new().unwrap();

        let first = fetcher.digest(&url).await.unwrap();
        let second = fetcher.digest(&url).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(first, sha256_bytes(TARBALL));
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let base = serve_tarball().await;
        let fetcher = HashFetcher::new().unwrap();

        let err = fetcher.digest(&format!("{base}/missing.tgz")).await.unwrap_err();
        assert_eq!(err.code(), codes::HASH_FETCH_FAILED);
        assert!(err.message().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let addr = closed_addr().await;

        let fetcher = HashFetcher::new().unwrap();
        let err = fetcher
            .digest(&format!("http://{addr}/pkg.tgz"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::HASH_FETCH_FAILED);
        assert!(err.message().starts_with("Connection failed"), "{err}");
    }

    #[tokio::test]
    async fn test_fill_hashes_stops_at_first_failure() {
        let silent = serve_silence().await;
        let closed = closed_addr().await;

        let mut resources = IndexMap::new();
        resources.insert("slow".to_string(), record(&format!("https://{silent}/slow.tgz")));
        resources.insert("down".to_string(), record(&format!("https://{closed}/down.tgz")));

        let fetcher = HashFetcher::new().unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            fetcher.fill_hashes(&mut resources),
        )
        .await
        .expect("batch should not wait for the stalled fetch");

        assert_eq!(result.unwrap_err().code(), codes::HASH_FETCH_FAILED);
        assert!(resources.values().all(|r| r.sha256.is_none()));
    }

    #[tokio::test]
    async fn test_fill_hashes_leaves_non_qualifying_empty() {
        let mut resources = IndexMap::new();
        resources.insert("a".to_string(), record("git+https://example.com/a.git"));
        resources.insert("b".to_string(), record("http://registry.example/b.tgz"));

        let fetcher = HashFetcher::new().unwrap().with_max_concurrent(2);
        fetcher.fill_hashes(&mut resources).await.unwrap();

        assert!(resources.values().all(|r| r.sha256.is_none()));
    }
}
