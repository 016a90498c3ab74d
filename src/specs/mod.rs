// src/specs/mod.rs
//! # Consistency “specs”
//!
//! Each spec is one named scenario: a handful of counts read off different
//! pages, plus the rules those counts must satisfy together. A spec encodes
//! *where the number lives* on each page (source name + locator) and *how the
//! numbers relate* (floors, equal pairs, sub-count ordering, tolerance bands).
//!
//! ## What lives here
//! - **Probe tables**: `(source, locator)` pairs, as plain config structs with
//!   production defaults; any of them can be overridden from TOML.
//! - **Pure checks**: `check(&counts) -> ScenarioReport` takes already
//!   extracted integers, so the rules are testable without a network.
//! - **Wiring**: `run(&cache)` reads every probe through the document cache,
//!   then calls `check`.
//!
//! ## What does **not** live here
//! - Fetching, caching, size floors (`store`).
//! - Locator evaluation and digit stripping (`extract`, `core`).
//! - Deciding which scenarios run and how results are shown (`runner`, `cli`).
//!
//! ## Conventions & invariants
//! - A probe that cannot produce a number fails the scenario with the
//!   extraction error. It is never read as zero.
//! - Every assertion is evaluated and recorded; one failure fails the
//!   scenario. Scenarios share nothing except the document cache.

use serde::Deserialize;
use thiserror::Error;

use crate::check::{Reading, ScenarioReport};
use crate::config::CheckOptions;
use crate::extract::{self, ExtractError};
use crate::store::{DocumentCache, FetchError};

pub mod activity_count;
pub mod publisher_count;

pub use activity_count::{ActivityCountSpec, ActivityCounts};
pub use publisher_count::{PublisherCountSpec, PublisherCounts};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Where one count lives: a registered source and a locator inside it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Probe {
    pub source: String,
    pub locator: String,
}

impl Probe {
    pub fn new(source: &str, locator: &str) -> Self {
        Self { source: s!(source), locator: s!(locator) }
    }

    pub fn read(&self, cache: &DocumentCache, label: &'static str) -> Result<Reading, ScenarioError> {
        let doc = cache.get(&self.source)?;
        let value = extract::query_single_integer(&doc, &self.locator)?;
        logd!("Probe: {label} = {value} ({} @ {})", self.source, self.locator);
        Ok(Reading::new(label, value))
    }
}

pub trait Scenario {
    fn name(&self) -> &'static str;

    /// Source names this scenario reads.
    fn sources(&self) -> Vec<&str>;

    fn run(&self, cache: &DocumentCache) -> Result<ScenarioReport, ScenarioError>;
}

/// Every scenario, configured from `opts`, in a stable order.
pub fn all(opts: &CheckOptions) -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(opts.activity_count.clone()),
        Box::new(opts.publisher_count.clone()),
    ]
}

pub fn names() -> [&'static str; 2] {
    [activity_count::NAME, publisher_count::NAME]
}
