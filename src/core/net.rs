// src/core/net.rs
// Blocking HTTP GET. Non-2xx responses come back as data, not errors;
// callers decide what a bad status means for them.

use std::time::Duration;

use thiserror::Error;

use crate::config::options::NetOptions;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("GET {url} failed: {reason}")]
pub struct NetError {
    pub url: String,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can GET a URL. The document cache and the facet counter
/// only talk to the network through this.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<RawResponse, NetError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(opts: &NetOptions) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(opts.timeout_secs))
            .user_agent(opts.user_agent.as_str())
            .build()
            .map_err(|e| NetError { url: s!(), reason: e.to_string() })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<RawResponse, NetError> {
        let fail = |e: reqwest::Error| NetError { url: s!(url), reason: e.to_string() };

        logd!("Net: GET {url}");
        let resp = self.client.get(url).send().map_err(fail)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(fail)?.to_vec();
        logd!("Net: {status} {url} ({} bytes)", body.len());

        Ok(RawResponse { url: s!(url), status, body })
    }
}
