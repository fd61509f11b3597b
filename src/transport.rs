//! HTTP transport seam.
//!
//! The fetcher only needs "GET this URL, give me status + body". Tests plug in a
//! canned transport; production uses [`ReqwestTransport`].

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;

/// Raw response handed back to the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking GET capability.
pub trait Transport: Send + Sync {
    /// Perform a GET. Errors are reserved for failures below HTTP (connect,
    /// timeout, unreadable body); any status code is a successful `HttpResponse`.
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// `reqwest` blocking client with the configured timeouts.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout()) // total request timeout
            .connect_timeout(config.connect_timeout())
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wbi_dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("build http client: {e}")))?;
        Ok(Self { http })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self.http.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Network(format!("timed out: {e}"))
            } else {
                FetchError::Network(e.to_string())
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| FetchError::Network(format!("read body: {e}")))?;
        Ok(HttpResponse { status, body })
    }
}
