// tests/aggregate.rs
//
// Facet-weighted activity total over a canned registry search endpoint.
//
mod common;

use common::CannedFetcher;
use xcheck::aggregate::{compute_total_activity_count, AggregateError};
use xcheck::config::FacetOptions;

fn facet_body(table: &str) -> String {
    format!(
        r#"{{"help": "package_search", "success": true,
            "result": {{"count": 1234, "sort": "score desc",
                        "facets": {{"extras_activity_count": {table}}},
                        "results": [], "search_facets": {{}}}}}}"#
    )
}

#[test]
fn sums_count_times_frequency() {
    let opts = FacetOptions::default();
    let f = CannedFetcher::new().page(&opts.url, facet_body(r#"{"10": 3, "20": 1}"#));
    assert_eq!(compute_total_activity_count(&f, &opts), Ok(50));
}

#[test]
fn empty_facets_sum_to_zero() {
    let opts = FacetOptions::default();
    let f = CannedFetcher::new().page(&opts.url, facet_body("{}"));
    assert_eq!(compute_total_activity_count(&f, &opts), Ok(0));
}

#[test]
fn every_call_asks_again() {
    let opts = FacetOptions::default();
    let f = CannedFetcher::new().page(&opts.url, facet_body(r#"{"1": 1}"#));
    compute_total_activity_count(&f, &opts).unwrap();
    compute_total_activity_count(&f, &opts).unwrap();
    assert_eq!(f.calls(&opts.url), 2);
}

#[test]
fn http_failure_is_a_connection_error() {
    let opts = FacetOptions::default();
    let f = CannedFetcher::new().status(&opts.url, 500, "Internal Server Error");
    let err = compute_total_activity_count(&f, &opts).unwrap_err();
    assert_eq!(err, AggregateError::Connection { url: opts.url.clone(), reason: "HTTP 500".into() });

    // Unreachable host
    let opts = FacetOptions { url: "http://nowhere.invalid/".into(), ..FacetOptions::default() };
    let err = compute_total_activity_count(&CannedFetcher::new(), &opts).unwrap_err();
    assert!(matches!(err, AggregateError::Connection { .. }));
    assert!(err.to_string().contains("nowhere.invalid"));
}

#[test]
fn custom_facet_field() {
    let opts = FacetOptions { url: "http://example.test/search".into(), field: "num_activities".into() };
    let body = r#"{"result": {"facets": {"num_activities": {"5": 2, "100": 4}}}}"#;
    let f = CannedFetcher::new().page(&opts.url, body);
    assert_eq!(compute_total_activity_count(&f, &opts), Ok(410));
}
