// src/check.rs
//! Relational assertions over extracted counts, and the per-scenario report
//! that records every one of them.

use std::fmt;

use thiserror::Error;

/// One extracted count with the name it is reported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    pub label: &'static str,
    pub value: u64,
}

impl Reading {
    pub fn new(label: &'static str, value: u64) -> Self {
        Self { label, value }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Assertion {
    /// Sanity floor: a broken page must not pass by reporting zero.
    AtLeast { reading: Reading, min: u64 },
    /// Same metric shown in two places.
    Equal { left: Reading, right: Reading },
    /// A sub-count never exceeds its total.
    NotGreater { part: Reading, total: Reading },
    /// `value` within `tolerance` (fraction) of `reference`.
    WithinRatio { value: Reading, reference: Reading, tolerance: f64 },
}

impl Assertion {
    pub fn holds(&self) -> bool {
        match *self {
            Assertion::AtLeast { reading, min } => reading.value >= min,
            Assertion::Equal { left, right } => left.value == right.value,
            Assertion::NotGreater { part, total } => part.value <= total.value,
            Assertion::WithinRatio { value, reference, tolerance } => {
                within_ratio(value.value, reference.value, tolerance)
            }
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::AtLeast { reading, min } => write!(f, "{reading} >= {min}"),
            Assertion::Equal { left, right } => write!(f, "{left} == {right}"),
            Assertion::NotGreater { part, total } => write!(f, "{part} <= {total}"),
            Assertion::WithinRatio { value, reference, tolerance } => {
                let r = reference.value as f64;
                write!(
                    f,
                    "{value} within {}% of {reference} [{:.1}, {:.1}]",
                    tolerance * 100.0,
                    r * (1.0 - tolerance),
                    r * (1.0 + tolerance)
                )
            }
        }
    }
}

/// `b*(1-t) <= a <= b*(1+t)`
pub fn within_ratio(a: u64, b: u64, tolerance: f64) -> bool {
    let (a, b) = (a as f64, b as f64);
    b * (1.0 - tolerance) <= a && a <= b * (1.0 + tolerance)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub assertion: Assertion,
    pub passed: bool,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("scenario `{scenario}` failed {} assertion(s): {}", .violations.len(), .violations.join("; "))]
pub struct CheckError {
    pub scenario: String,
    pub violations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    pub readings: Vec<Reading>,
    pub outcomes: Vec<Outcome>,
}

impl ScenarioReport {
    pub fn new(scenario: &'static str, readings: Vec<Reading>) -> Self {
        Self { scenario, readings, outcomes: Vec::new() }
    }

    /// Evaluate and record. Evaluation never stops early; a report lists
    /// every assertion of its scenario.
    pub fn check(&mut self, assertion: Assertion) -> &mut Self {
        let passed = assertion.holds();
        if passed {
            logd!("Check: {} ok: {assertion}", self.scenario);
        } else {
            logw!("Check: {} FAILED: {assertion}", self.scenario);
        }
        self.outcomes.push(Outcome { assertion, passed });
        self
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn violations(&self) -> impl Iterator<Item = &Assertion> {
        self.outcomes.iter().filter(|o| !o.passed).map(|o| &o.assertion)
    }

    pub fn reading(&self, label: &str) -> Option<u64> {
        self.readings.iter().find(|r| r.label == label).map(|r| r.value)
    }

    pub fn into_result(self) -> Result<Self, CheckError> {
        if self.passed() {
            return Ok(self);
        }
        Err(CheckError {
            scenario: s!(self.scenario),
            violations: self.violations().map(|a| a.to_string()).collect(),
        })
    }
}
