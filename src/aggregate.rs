// src/aggregate.rs
//! Total activity count from the registry's faceted package search.
//!
//! The search endpoint returns, per distinct "activities in this dataset"
//! value, how many datasets report it. The total is `Σ count × frequency`:
//! a facet `{"30": 2}` means two datasets of 30 activities, i.e. 60.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use thiserror::Error;

use crate::config::FacetOptions;
use crate::core::net::Fetch;

/// Count value (as the API spells it) → number of datasets with that count.
pub type FacetFrequencyTable = BTreeMap<String, u64>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("unable to reach {url} to query activities: {reason}")]
    Connection { url: String, reason: String },

    #[error("facet response is not valid: {0}")]
    Parse(String),

    #[error("facet `{0}` missing from response")]
    MissingFacet(String),

    #[error("facet key {0:?} is not a whole number")]
    BadFacetKey(String),

    #[error("activity total overflowed")]
    Overflow,
}

#[derive(Deserialize)]
struct FacetResponse {
    result: FacetResult,
}

#[derive(Deserialize)]
struct FacetResult {
    facets: HashMap<String, FacetFrequencyTable>,
}

/// One request, no caching: every call asks the registry again.
pub fn compute_total_activity_count(fetcher: &dyn Fetch, opts: &FacetOptions) -> Result<u64, AggregateError> {
    logd!("Facets: GET {}", opts.url);
    let resp = fetcher.get(&opts.url).map_err(|e| AggregateError::Connection {
        url: e.url,
        reason: e.reason,
    })?;
    if !resp.is_success() {
        loge!("Facets: HTTP {} from {}", resp.status, opts.url);
        return Err(AggregateError::Connection {
            url: s!(&opts.url),
            reason: format!("HTTP {}", resp.status),
        });
    }

    let table = parse_facet_table(&resp.text(), &opts.field)?;
    let total = weighted_total(&table)?;
    logf!("Facets: {} distinct counts, {total} activities", table.len());
    Ok(total)
}

pub fn parse_facet_table(body: &str, field: &str) -> Result<FacetFrequencyTable, AggregateError> {
    let mut resp: FacetResponse =
        serde_json::from_str(body).map_err(|e| AggregateError::Parse(e.to_string()))?;
    resp.result
        .facets
        .remove(field)
        .ok_or_else(|| AggregateError::MissingFacet(s!(field)))
}

/// `Σ int(key) × frequency`. An empty table is 0.
pub fn weighted_total(table: &FacetFrequencyTable) -> Result<u64, AggregateError> {
    table.iter().try_fold(0u64, |acc, (key, &freq)| {
        let count: u64 = key
            .trim()
            .parse()
            .map_err(|_| AggregateError::BadFacetKey(key.clone()))?;
        count
            .checked_mul(freq)
            .and_then(|n| acc.checked_add(n))
            .ok_or(AggregateError::Overflow)
    })
}
