// tests/common/mod.rs
//
// Shared helpers: an in-memory fetcher that counts requests, and fixture
// loading.
//
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use xcheck::config::consts::*;
use xcheck::config::CheckOptions;
use xcheck::core::net::{Fetch, NetError, RawResponse};
use xcheck::runner;
use xcheck::store::DocumentCache;

pub fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name].iter().collect();
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Serves canned bodies by URL. Unknown URLs fail like a refused connection.
#[derive(Default)]
pub struct CannedFetcher {
    pages: HashMap<String, (u16, String)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), (200, body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), (status, body.into()));
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Fetch for CannedFetcher {
    fn get(&self, url: &str) -> Result<RawResponse, NetError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.pages.get(url) {
            Some((status, body)) => Ok(RawResponse {
                url: url.to_string(),
                status: *status,
                body: body.clone().into_bytes(),
            }),
            None => Err(NetError { url: url.to_string(), reason: "connection refused".into() }),
        }
    }
}

/// Every production URL answered by its fixture page.
pub fn live_like() -> CannedFetcher {
    CannedFetcher::new()
        .page(REGISTRY_HOME_URL, fixture("registry_home.html"))
        .page(DASH_HOME_URL, fixture("dashboard_home.html"))
        .page(DASH_PUBLISHERS_URL, fixture("dashboard_publishers.html"))
        .page(DASH_ACTIVITIES_URL, fixture("dashboard_activities.html"))
        .page(DATASTORE_ACTIVITY_COUNT_URL, fixture("datastore_count.xml"))
}

/// Default options wired to `fetcher`.
pub fn cache_over(fetcher: Arc<CannedFetcher>) -> DocumentCache {
    runner::build_cache(&CheckOptions::default(), fetcher)
}
