// src/specs/activity_count.rs
//! Activity totals: dashboard homepage, dashboard activities page and the
//! datastore API must tell the same story.
//!
//! - all five counts clear `min_activity_count`
//! - homepage and activities page agree exactly (total and unique)
//! - unique ≤ total on both dashboard pages
//! - the datastore is within `max_datastore_disparity` of the unique count

use serde::Deserialize;

use super::{Probe, Scenario, ScenarioError};
use crate::check::{Assertion, Reading, ScenarioReport};
use crate::config::consts::*;
use crate::store::DocumentCache;

pub const NAME: &str = "activity_count";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActivityCountSpec {
    pub dash_home: Probe,
    pub dash_home_unique: Probe,
    pub dash_activities: Probe,
    pub dash_activities_unique: Probe,
    pub datastore: Probe,
    pub min_activity_count: u64,
    pub max_datastore_disparity: f64,
}

impl Default for ActivityCountSpec {
    fn default() -> Self {
        Self {
            dash_home: Probe::new(DASH_HOME, DASH_HOME_ACTIVITIES_XPATH),
            dash_home_unique: Probe::new(DASH_HOME, DASH_HOME_UNIQUE_ACTIVITIES_XPATH),
            dash_activities: Probe::new(DASH_ACTIVITIES, DASH_ACTIVITIES_XPATH),
            dash_activities_unique: Probe::new(DASH_ACTIVITIES, DASH_ACTIVITIES_UNIQUE_XPATH),
            datastore: Probe::new(DATASTORE_ACTIVITY_COUNT, DATASTORE_TOTAL_COUNT_XPATH),
            min_activity_count: MIN_ACTIVITY_COUNT,
            max_datastore_disparity: MAX_DATASTORE_DISPARITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityCounts {
    pub dash_home: u64,
    pub dash_home_unique: u64,
    pub dash_activities: u64,
    pub dash_activities_unique: u64,
    pub datastore: u64,
}

impl ActivityCountSpec {
    pub fn probes(&self) -> Vec<(&'static str, &Probe)> {
        vec![
            ("dash_home", &self.dash_home),
            ("dash_home_unique", &self.dash_home_unique),
            ("dash_activities", &self.dash_activities),
            ("dash_activities_unique", &self.dash_activities_unique),
            ("datastore", &self.datastore),
        ]
    }

    pub fn extract(&self, cache: &DocumentCache) -> Result<ActivityCounts, ScenarioError> {
        Ok(ActivityCounts {
            dash_home: self.dash_home.read(cache, "dash_home")?.value,
            dash_home_unique: self.dash_home_unique.read(cache, "dash_home_unique")?.value,
            dash_activities: self.dash_activities.read(cache, "dash_activities")?.value,
            dash_activities_unique: self.dash_activities_unique.read(cache, "dash_activities_unique")?.value,
            datastore: self.datastore.read(cache, "datastore")?.value,
        })
    }

    pub fn check(&self, c: &ActivityCounts) -> ScenarioReport {
        let home = Reading::new("dash_home", c.dash_home);
        let home_unique = Reading::new("dash_home_unique", c.dash_home_unique);
        let acts = Reading::new("dash_activities", c.dash_activities);
        let acts_unique = Reading::new("dash_activities_unique", c.dash_activities_unique);
        let datastore = Reading::new("datastore", c.datastore);

        let all = vec![home, home_unique, acts, acts_unique, datastore];
        let mut report = ScenarioReport::new(NAME, all.clone());

        for reading in all {
            report.check(Assertion::AtLeast { reading, min: self.min_activity_count });
        }
        report
            .check(Assertion::Equal { left: home, right: acts })
            .check(Assertion::Equal { left: home_unique, right: acts_unique })
            .check(Assertion::NotGreater { part: home_unique, total: home })
            .check(Assertion::NotGreater { part: acts_unique, total: acts })
            .check(Assertion::WithinRatio {
                value: datastore,
                reference: home_unique,
                tolerance: self.max_datastore_disparity,
            });
        report
    }
}

impl Scenario for ActivityCountSpec {
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
