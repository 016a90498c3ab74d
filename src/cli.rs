// src/cli.rs
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{self, AggregateError};
use crate::check::ScenarioReport;
use crate::config::consts::DEFAULT_LOG_FILE;
use crate::config::{CheckOptions, ConfigError};
use crate::core::net::{Fetch, HttpFetcher, NetError};
use crate::progress::Progress;
use crate::runner::{self, UnknownScenario};
use crate::specs::{self, ScenarioError};

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown arg: {0}")]
    UnknownArg(String),

    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error(transparent)]
    UnknownScenario(#[from] UnknownScenario),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("cannot open log file: {0}")]
    Log(#[from] std::io::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    pub scenarios: Vec<String>,
    pub list: bool,
    pub total_activities: bool,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub help: bool,
}

pub fn parse_args<I>(args: I) -> Result<Params, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut params = Params::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "-s" | "--scenario" => {
                let v = args.next().ok_or(CliError::MissingValue("--scenario"))?;
                // Allow `-s a,b` as well as `-s a -s b`
                params.scenarios.extend(
                    v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from),
                );
            }
            "-l" | "--list" => params.list = true,
            "-t" | "--total-activities" => params.total_activities = true,
            "-c" | "--config" => {
                params.config = Some(PathBuf::from(args.next().ok_or(CliError::MissingValue("--config"))?));
            }
            "-v" | "--verbose" => params.verbose = true,
            "--log" => params.log_file = Some(PathBuf::from(DEFAULT_LOG_FILE)),
            "--log-file" => {
                params.log_file = Some(PathBuf::from(args.next().ok_or(CliError::MissingValue("--log-file"))?));
            }
            "-h" | "--help" => params.help = true,
            _ => return Err(CliError::UnknownArg(a)),
        }
    }
    Ok(params)
}

/// Run what `params` asks for. `Ok(true)` when everything checked passed.
pub fn run(params: &Params) -> Result<bool, CliError> {
    crate::log::init(params.verbose, params.log_file.as_deref())?;

    let opts = match &params.config {
        Some(path) => CheckOptions::load(path)?,
        None => CheckOptions::default(),
    };

    if params.list {
        for s in specs::all(&opts) {
            println!("{}\t{}", s.name(), s.sources().join(", "));
        }
        return Ok(true);
    }

    // Resolve names before touching the network
    let scenarios = runner::select(&opts, &params.scenarios)?;
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&opts.net)?);

    if params.total_activities {
        let total = aggregate::compute_total_activity_count(fetcher.as_ref(), &opts.facets)?;
        println!("Total activities (registry facets): {total}");
        if params.scenarios.is_empty() {
            return Ok(true);
        }
    }

    let cache = runner::build_cache(&opts, fetcher);
    let mut progress = PrintProgress::default();
    let summary = runner::run(&scenarios, &cache, Some(&mut progress));
    println!(
        "{} of {} scenario(s) passed",
        summary.outcomes.len() - summary.failed(),
        summary.outcomes.len()
    );
    Ok(summary.all_passed())
}

/// Prints one block per scenario to stdout.
#[derive(Default)]
struct PrintProgress {
    total: usize,
    done: usize,
}

impl Progress for PrintProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        println!("Running {total} scenario(s)");
    }

    fn scenario_done(&mut self, report: &ScenarioReport) {
        self.done += 1;
        let verdict = if report.passed() { "PASS" } else { "FAIL" };
        println!("[{}/{}] {verdict} {}", self.done, self.total, report.scenario);
        for r in &report.readings {
            println!("    {:<24}{}", r.label, r.value);
        }
        for v in report.violations() {
            println!("  ✗ {v}");
        }
    }

    fn scenario_error(&mut self, name: &str, err: &ScenarioError) {
        self.done += 1;
        println!("[{}/{}] ERROR {name}: {err}", self.done, self.total);
    }
}
