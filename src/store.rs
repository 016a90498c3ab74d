// src/store.rs
//! Fetch-once document cache.
//!
//! Sources are registered by name up front; `get(name)` loads the URL the
//! first time it is asked for and hands out the same `Arc<Document>` (or the
//! same failure) on every later call. Nothing is refreshed within a run.
//!
//! The cache is `Sync`. Concurrent first lookups of one name block on a
//! per-name `OnceLock`, so the network is hit once per name no matter how
//! many callers race.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::Deserialize;
use thiserror::Error;

use crate::core::html::Tree;
use crate::core::net::{Fetch, NetError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub min_response_size: Option<usize>,
}

impl Source {
    pub fn new(url: &str) -> Self {
        Self { url: s!(url), min_response_size: None }
    }

    pub fn with_min_size(mut self, bytes: usize) -> Self {
        self.min_response_size = Some(bytes);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("source `{0}` is not registered for this run")]
    NotRegistered(String),

    #[error("source `{name}`: {source}")]
    Http { name: String, source: NetError },

    #[error("source `{name}` ({url}) answered HTTP {status}")]
    Status { name: String, url: String, status: u16 },

    #[error("source `{name}` ({url}) returned {size} bytes, expected at least {min}")]
    TooSmall { name: String, url: String, size: usize, min: usize },
}

/// A loaded response. The markup tree is built on first query and kept.
#[derive(Debug)]
pub struct Document {
    name: String,
    url: String,
    status: u16,
    text: String,
    tree: OnceLock<Tree>,
}

impl Document {
    pub fn new(name: &str, url: &str, status: u16, text: String) -> Self {
        Self { name: s!(name), url: s!(url), status, text, tree: OnceLock::new() }
    }

    /// Document that never came over the network (fixtures, saved pages).
    pub fn from_text(name: &str, text: &str) -> Self {
        Self::new(name, "", 200, s!(text))
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn url(&self) -> &str { &self.url }
    pub fn status(&self) -> u16 { self.status }
    pub fn text(&self) -> &str { &self.text }

    /// Size of the body in bytes.
    pub fn size(&self) -> usize { self.text.len() }

    pub fn tree(&self) -> &Tree {
        self.tree.get_or_init(|| Tree::parse(&self.text))
    }
}

type Slot = Arc<OnceLock<Result<Arc<Document>, FetchError>>>;

pub struct DocumentCache {
    fetcher: Arc<dyn Fetch>,
    sources: BTreeMap<String, Source>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl DocumentCache {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher, sources: BTreeMap::new(), slots: Mutex::new(HashMap::new()) }
    }

    pub fn with_sources<I, S>(fetcher: Arc<dyn Fetch>, sources: I) -> Self
    where
        I: IntoIterator<Item = (S, Source)>,
        S: Into<String>,
    {
        let mut cache = Self::new(fetcher);
        for (name, src) in sources {
            cache.register(name, src);
        }
        cache
    }

    /// Register (or re-point) a source. Re-registering drops anything already
    /// loaded under that name.
    pub fn register(&mut self, name: impl Into<String>, source: Source) {
        let name = name.into();
        self.slots.get_mut().unwrap_or_else(PoisonError::into_inner).remove(&name);
        self.sources.insert(name, source);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn registered(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True once a fetch for `name` has finished, successfully or not.
    pub fn is_loaded(&self, name: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(name).is_some_and(|slot| slot.get().is_some())
    }

    pub fn get(&self, name: &str) -> Result<Arc<Document>, FetchError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| FetchError::NotRegistered(s!(name)))?;

        let slot: Slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(s!(name)).or_default())
        };
        // Lock released; only callers of this one name wait on the slot
        slot.get_or_init(|| self.load(name, source)).clone()
    }

    fn load(&self, name: &str, source: &Source) -> Result<Arc<Document>, FetchError> {
        logf!("Fetch: {name} <- {}", source.url);
        let resp = self.fetcher.get(&source.url).map_err(|e| {
            loge!("Fetch: {name}: {e}");
            FetchError::Http { name: s!(name), source: e }
        })?;

        if !resp.is_success() {
            loge!("Fetch: {name}: HTTP {}", resp.status);
            return Err(FetchError::Status { name: s!(name), url: s!(&source.url), status: resp.status });
        }

        let size = resp.body.len();
        if let Some(min) = source.min_response_size {
            if size < min {
                loge!("Fetch: {name}: {size} bytes < {min}");
                return Err(FetchError::TooSmall { name: s!(name), url: s!(&source.url), size, min });
            }
        }
        logd!("Fetch: {name} OK ({size} bytes)");

        Ok(Arc::new(Document::new(name, &source.url, resp.status, resp.text())))
    }
}
