// tests/scenarios.rs
//
// Scenarios end to end over fixture pages served by an in-memory fetcher,
// plus the runner's selection and independence rules.
//
mod common;

use std::sync::Arc;

use common::{cache_over, fixture, live_like, CannedFetcher};
use xcheck::check::ScenarioReport;
use xcheck::config::consts::*;
use xcheck::config::CheckOptions;
use xcheck::extract::ExtractError;
use xcheck::progress::{NullProgress, Progress};
use xcheck::runner;
use xcheck::specs::{self, Scenario, ScenarioError};
use xcheck::store::FetchError;

#[test]
fn activity_count_passes_on_fixture_pages() {
    let f = Arc::new(live_like());
    let cache = cache_over(f.clone());
    let report = CheckOptions::default().activity_count.run(&cache).unwrap();

    assert!(report.passed(), "{:?}", report.violations().map(|a| a.to_string()).collect::<Vec<_>>());
    assert_eq!(report.reading("dash_home"), Some(600_000));
    assert_eq!(report.reading("dash_activities_unique"), Some(590_000));
    assert_eq!(report.reading("datastore"), Some(580_000));

    // Two probes per dashboard page, one request per page
    assert_eq!(f.calls(DASH_HOME_URL), 1);
    assert_eq!(f.calls(DASH_ACTIVITIES_URL), 1);
    assert_eq!(f.total_calls(), 3);
}

#[test]
fn activity_count_fails_when_datastore_drifts() {
    let xml = fixture("datastore_count.xml").replace("580000", "500000");
    let f = Arc::new(live_like().page(DATASTORE_ACTIVITY_COUNT_URL, xml));
    let report = CheckOptions::default().activity_count.run(&cache_over(f)).unwrap();

    assert!(!report.passed());
    assert!(report
        .violations()
        .any(|a| a.to_string().starts_with("datastore (500000) within 10% of dash_home_unique (590000)")));
}

#[test]
fn publisher_count_passes_on_fixture_pages() {
    let cache = cache_over(Arc::new(live_like()));
    let report = CheckOptions::default().publisher_count.run(&cache).unwrap();
    assert!(report.passed());
    assert_eq!(report.reading("registry"), Some(498));
    assert_eq!(report.reading("dash_publishers"), Some(501));
}

#[test]
fn truncated_datastore_reply_fails_the_fetch() {
    let f = Arc::new(live_like().page(DATASTORE_ACTIVITY_COUNT_URL, "<result><ok>True</ok></result>"));
    let err = CheckOptions::default().activity_count.run(&cache_over(f)).unwrap_err();
    assert!(matches!(err, ScenarioError::Fetch(FetchError::TooSmall { min: 300, .. })));
}

#[test]
fn redesigned_page_is_a_locator_miss_not_zero() {
    let f = Arc::new(live_like().page(DASH_PUBLISHERS_URL, "<html><body><h1>Moved</h1></body></html>"));
    let err = CheckOptions::default().publisher_count.run(&cache_over(f)).unwrap_err();
    assert!(matches!(err, ScenarioError::Extract(ExtractError::LocatorMiss { .. })), "{err:?}");
}

#[test]
fn scenario_sources_are_registered_defaults() {
    let opts = CheckOptions::default();
    for s in specs::all(&opts) {
        for src in s.sources() {
            assert!(opts.sources.contains_key(src), "{} reads {src}", s.name());
        }
    }
    assert_eq!(specs::names(), ["activity_count", "publisher_count"]);
}

#[test]
fn select_by_name() {
    let opts = CheckOptions::default();
    let all = runner::select(&opts, &[]).unwrap();
    assert_eq!(all.iter().map(|s| s.name()).collect::<Vec<_>>(), specs::names());

    let picked = runner::select(&opts, &["publisher_count".into(), "publisher_count".into()]).unwrap();
    assert_eq!(picked.len(), 1);

    let err = runner::select(&opts, &["nope".into()]).err().unwrap();
    assert_eq!(err.to_string(), "unknown scenario `nope` (known: activity_count, publisher_count)");
}

#[derive(Default)]
struct Recorder {
    begun: usize,
    done: Vec<String>,
    errors: Vec<String>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) {
        self.begun = total;
    }
    fn scenario_done(&mut self, report: &ScenarioReport) {
        self.done.push(report.scenario.to_string());
    }
    fn scenario_error(&mut self, name: &str, _err: &ScenarioError) {
        self.errors.push(name.to_string());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

#[test]
fn one_broken_scenario_does_not_stop_the_other() {
    // Registry down: publisher_count cannot run, activity_count still does
    let f = Arc::new(
        CannedFetcher::new()
            .page(DASH_HOME_URL, fixture("dashboard_home.html"))
            .page(DASH_PUBLISHERS_URL, fixture("dashboard_publishers.html"))
            .page(DASH_ACTIVITIES_URL, fixture("dashboard_activities.html"))
            .page(DATASTORE_ACTIVITY_COUNT_URL, fixture("datastore_count.xml")),
    );
    let opts = CheckOptions::default();
    let cache = runner::build_cache(&opts, f.clone());
    let scenarios = runner::select(&opts, &[]).unwrap();

    let mut rec = Recorder::default();
    let summary = runner::run(&scenarios, &cache, Some(&mut rec));

    assert!(!summary.all_passed());
    assert_eq!(summary.failed(), 1);
    assert!(summary.outcomes[0].passed());
    assert!(matches!(
        &summary.outcomes[1].result,
        Err(ScenarioError::Fetch(FetchError::Http { name, .. })) if name == REGISTRY_HOME
    ));

    assert_eq!(rec.begun, 2);
    assert_eq!(rec.done, vec!["activity_count"]);
    assert_eq!(rec.errors, vec!["publisher_count"]);
    assert!(rec.finished);

    // Three pages for activity_count, one failed registry attempt
    assert_eq!(f.total_calls(), 4);
}

#[test]
fn full_run_passes_with_or_without_progress_sink() {
    let opts = CheckOptions::default();
    let scenarios = runner::select(&opts, &[]).unwrap();

    let cache = runner::build_cache(&opts, Arc::new(live_like()));
    let summary = runner::run(&scenarios, &cache, None);
    assert!(summary.all_passed());
    assert_eq!(summary.outcomes.len(), 2);

    let cache = runner::build_cache(&opts, Arc::new(live_like()));
    assert!(runner::run(&scenarios, &cache, Some(&mut NullProgress)).all_passed());
}
