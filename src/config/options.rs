// src/config/options.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::consts::*;
use crate::specs::{ActivityCountSpec, PublisherCountSpec};
use crate::store::Source;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("cannot parse config {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a run needs. Every section is optional in the TOML file;
/// missing sections fall back to the production values in `consts`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub net: NetOptions,
    #[serde(deserialize_with = "extend_default_sources")]
    pub sources: BTreeMap<String, Source>,
    pub activity_count: ActivityCountSpec,
    pub publisher_count: PublisherCountSpec,
    pub facets: FacetOptions,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            net: NetOptions::default(),
            sources: default_sources(),
            activity_count: ActivityCountSpec::default(),
            publisher_count: PublisherCountSpec::default(),
            facets: FacetOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self { timeout_secs: TIMEOUT_SECS, user_agent: s!(USER_AGENT) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FacetOptions {
    pub url: String,
    pub field: String,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self { url: s!(ACTIVITY_FACET_URL), field: s!(ACTIVITY_FACET_FIELD) }
    }
}

pub fn default_sources() -> BTreeMap<String, Source> {
    [
        (REGISTRY_HOME, Source::new(REGISTRY_HOME_URL)),
        (DASH_HOME, Source::new(DASH_HOME_URL)),
        (DASH_PUBLISHERS, Source::new(DASH_PUBLISHERS_URL)),
        (DASH_ACTIVITIES, Source::new(DASH_ACTIVITIES_URL)),
        (
            DATASTORE_ACTIVITY_COUNT,
            Source::new(DATASTORE_ACTIVITY_COUNT_URL).with_min_size(DATASTORE_MIN_RESPONSE_SIZE),
        ),
    ]
    .into_iter()
    .map(|(name, src)| (s!(name), src))
    .collect()
}

fn extend_default_sources<'de, D>(d: D) -> Result<BTreeMap<String, Source>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut sources = default_sources();
    sources.extend(BTreeMap::<String, Source>::deserialize(d)?);
    Ok(sources)
}

impl CheckOptions {
    /// Read a TOML file. Sources listed in the file are added to (or replace)
    /// the built-in ones by name.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let opts = Self::parse(&text, path)?;
        logd!("Config: loaded {}", path.display());
        Ok(opts)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let opts: CheckOptions = toml::from_str(text)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Tolerances must be sane and every probe must name a known source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerances = [
            ("activity_count.max_datastore_disparity", self.activity_count.max_datastore_disparity),
            ("publisher_count.max_registry_disparity", self.publisher_count.max_registry_disparity),
        ];
        for (key, tol) in tolerances {
            if !tol.is_finite() || tol < 0.0 {
                return Err(ConfigError::Invalid(format!("{key} must be a non-negative number, got {tol}")));
            }
        }

        let probes = self.activity_count.probes().into_iter().chain(self.publisher_count.probes());
        for (label, probe) in probes {
            if !self.sources.contains_key(&probe.source) {
                return Err(ConfigError::Invalid(format!(
                    "probe `{label}` reads unknown source `{}`",
                    probe.source
                )));
            }
        }

        if self.net.timeout_secs == 0 {
            return Err(ConfigError::Invalid(s!("net.timeout_secs must be at least 1")));
        }
        Ok(())
    }
}
