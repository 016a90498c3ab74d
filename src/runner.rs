// src/runner.rs
use std::sync::Arc;

use thiserror::Error;

use crate::{
    check::ScenarioReport,
    config::CheckOptions,
    core::net::Fetch,
    progress::Progress,
    specs::{self, Scenario, ScenarioError},
    store::DocumentCache,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown scenario `{}` (known: {})", .0, specs::names().join(", "))]
pub struct UnknownScenario(pub String);

pub struct ScenarioOutcome {
    pub name: &'static str,
    pub result: Result<ScenarioReport, ScenarioError>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.passed())
    }
}

/// What a run produced, one entry per scenario in run order.
pub struct RunSummary {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }
}

/// Cache with every configured source registered.
pub fn build_cache(opts: &CheckOptions, fetcher: Arc<dyn Fetch>) -> DocumentCache {
    DocumentCache::with_sources(fetcher, opts.sources.clone())
}

/// Scenarios named in `names`, in the order given. Empty → all of them.
pub fn select(opts: &CheckOptions, names: &[String]) -> Result<Vec<Box<dyn Scenario>>, UnknownScenario> {
    let mut pool = specs::all(opts);
    if names.is_empty() {
        return Ok(pool);
    }
    let mut picked = Vec::with_capacity(names.len());
    for name in names {
        match pool.iter().position(|s| s.name() == name) {
            Some(i) => picked.push(pool.remove(i)),
            // Already picked: asking twice runs it once
            None if picked.iter().any(|s: &Box<dyn Scenario>| s.name() == name) => {}
            None => return Err(UnknownScenario(name.clone())),
        }
    }
    Ok(picked)
}

/// Run every scenario. A failure in one never stops the others; documents
/// are shared through `cache` so each source is fetched at most once.
pub fn run(
    scenarios: &[Box<dyn Scenario>],
    cache: &DocumentCache,
    mut progress: Option<&mut dyn Progress>,
) -> RunSummary {
    if let Some(p) = progress.as_deref_mut() {
        p.begin(scenarios.len());
    }

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let name = scenario.name();
        logf!("Run: {name} (sources: {})", scenario.sources().join(", "));
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Checking {name}…"));
        }

        let result = scenario.run(cache);
        match &result {
            Ok(report) => {
                if report.passed() {
                    logf!("Run: {name} passed ({} assertions)", report.outcomes.len());
                } else {
                    loge!("Run: {name} failed {} of {} assertions", report.violations().count(), report.outcomes.len());
                }
                if let Some(p) = progress.as_deref_mut() {
                    p.scenario_done(report);
                }
            }
            Err(e) => {
                loge!("Run: {name} could not be evaluated: {e}");
                if let Some(p) = progress.as_deref_mut() {
                    p.scenario_error(name, e);
                }
            }
        }
        outcomes.push(ScenarioOutcome { name, result });
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    RunSummary { outcomes }
}
