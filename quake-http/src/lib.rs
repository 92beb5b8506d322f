//! Async client for JSON earthquake feeds.
//!
//! One GET per call, no retries: a failed fetch is reported once and the
//! caller decides what to keep. Non-2xx responses become [`HttpError::Api`]
//! and are never decoded as a feed.
//!
//! ```no_run
//! # async fn demo() -> Result<(), quake_http::HttpError> {
//! let client = quake_http::HttpClient::new()?;
//! let feed: serde_json::Value = client
//!     .get_json("https://example.com/earthquakes.json", quake_http::RequestOpts::json())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Every request logs `http.request.start` and `http.response.headers` at
//! debug, a truncated body at trace, and `http.error` or
//! `http.response.decode_error` on failure. With `QUAKE_HTTP_RAW=1` the
//! request is also logged as a curl line and the response body in full (up to
//! 64 KiB) under the `http.raw` target.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::header;
pub use reqwest::{StatusCode, Url};

const RAW_ENV: &str = "QUAKE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// The request as a pasteable curl command.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string()];
    for (name, val) in headers.iter() {
        let v = val.to_str().unwrap_or("");
        parts.push(format!("-H '{}: {}'", name.as_str(), v.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// True for failures that happened before a response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Network(_) | HttpError::Build(_))
    }
}

/// Per-request overrides.
///
/// ```
/// use quake_http::RequestOpts;
/// use quake_http::header::ACCEPT;
///
/// let opts = RequestOpts::json();
/// assert_eq!(opts.headers[ACCEPT], "application/json");
/// assert!(opts.timeout.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    /// Replaces the client's default timeout for this request.
    pub timeout: Option<Duration>,
    pub headers: HeaderMap,
}

impl RequestOpts {
    /// Ask the server for JSON explicitly.
    pub fn json() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            timeout: None,
            headers,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Client with a 5s connect timeout and a 15s whole-request timeout.
    ///
    /// ```no_run
    /// use quake_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("quake/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// ```no_run
    /// use quake_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET an absolute URL and decode a 2xx body as JSON.
    pub async fn get_json<T>(&self, url: &str, opts: RequestOpts) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(url).map_err(|e| HttpError::Url(e.to_string()))?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = format!("q{}", NEXT_REQUEST.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            req_id=%req_id,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&url, &opts.headers);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let started = Instant::now();
        let resp = match self
            .inner
            .request(Method::GET, url)
            .timeout(timeout)
            .headers(opts.headers)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
                return Err(HttpError::Network(message));
            }
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
                return Err(HttpError::Network(message));
            }
        };
        let dur_ms = started.elapsed().as_millis() as u64;

        let server_req_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%server_req_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let raw = &bytes[..bytes.len().min(RAW_MAX_BODY)];
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                duration_ms=dur_ms,
                headers=?headers,
                body=%String::from_utf8_lossy(raw),
                truncated=bytes.len() > RAW_MAX_BODY
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        let request_id = server_req_id.to_string();
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

/// Pulls `message`, `detail` or `error` out of a JSON error body, else the
/// body itself.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
