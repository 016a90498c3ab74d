// src/progress.rs
use crate::check::ScenarioReport;
use crate::specs::ScenarioError;

/// Lightweight progress reporting for a checking run.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of scenarios.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A scenario ran to completion; the report says whether it passed.
    fn scenario_done(&mut self, _report: &ScenarioReport) {}

    /// A scenario could not be evaluated (fetch or extraction failure).
    fn scenario_error(&mut self, _name: &str, _err: &ScenarioError) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
