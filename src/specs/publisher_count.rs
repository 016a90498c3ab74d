// src/specs/publisher_count.rs
// Publisher totals: registry homepage vs. dashboard homepage vs. dashboard
// publishers page. Dashboard pages agree exactly; the registry may drift by
// `max_registry_disparity` from the publishers page.

use serde::Deserialize;

use super::{Probe, Scenario, ScenarioError};
use crate::check::{Assertion, Reading, ScenarioReport};
use crate::config::consts::*;
use crate::store::DocumentCache;

pub const NAME: &str = "publisher_count";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PublisherCountSpec {
    pub registry: Probe,
    pub dash_home: Probe,
    pub dash_publishers: Probe,
    pub min_publisher_count: u64,
    pub max_registry_disparity: f64,
}

impl Default for PublisherCountSpec {
    fn default() -> Self {
        Self {
            registry: Probe::new(REGISTRY_HOME, REGISTRY_PUBLISHERS_XPATH),
            dash_home: Probe::new(DASH_HOME, DASH_HOME_PUBLISHERS_XPATH),
            dash_publishers: Probe::new(DASH_PUBLISHERS, DASH_PUBLISHERS_XPATH),
            min_publisher_count: MIN_PUBLISHER_COUNT,
            max_registry_disparity: MAX_REGISTRY_DISPARITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublisherCounts {
    pub registry: u64,
    pub dash_home: u64,
    pub dash_publishers: u64,
}

impl PublisherCountSpec {
    pub fn probes(&self) -> Vec<(&'static str, &Probe)> {
        vec![
            ("registry", &self.registry),
            ("dash_home", &self.dash_home),
            ("dash_publishers", &self.dash_publishers),
        ]
    }

    pub fn extract(&self, cache: &DocumentCache) -> Result<PublisherCounts, ScenarioError> {
        Ok(PublisherCounts {
            registry: self.registry.read(cache, "registry")?.value,
            dash_home: self.dash_home.read(cache, "dash_home")?.value,
            dash_publishers: self.dash_publishers.read(cache, "dash_publishers")?.value,
        })
    }

    pub fn check(&self, c: &PublisherCounts) -> ScenarioReport {
        let registry = Reading::new("registry", c.registry);
        let home = Reading::new("dash_home", c.dash_home);
        let publishers = Reading::new("dash_publishers", c.dash_publishers);

        let mut report = ScenarioReport::new(NAME, vec![registry, home, publishers]);
        for reading in [registry, home, publishers] {
            report.check(Assertion::AtLeast { reading, min: self.min_publisher_count });
        }
        report
            .check(Assertion::Equal { left: home, right: publishers })
            .check(Assertion::WithinRatio {
                value: registry,
                reference: publishers,
                tolerance: self.max_registry_disparity,
            });
        report
    }
}

impl Scenario for PublisherCountSpec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn sources(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.probes().into_iter().map(|(_, p)| p.source.as_str()).collect();
        v.sort_unstable();
        v.dedup();
        v
    }

    fn run(&self, cache: &DocumentCache) -> Result<ScenarioReport, ScenarioError> {
        let counts = self.extract(cache)?;
        Ok(self.check(&counts))
    }
}
