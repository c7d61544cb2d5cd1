/// Service configuration loader - parses birdrisk.toml
///
/// Keeps the object-store location, pipeline parameters and a fallback
/// station list out of the code, so a deployment can point at a mirror or
/// widen the critical band without recompiling.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::ingest::vpts::DEFAULT_BASE_URL;
use crate::model::{StationContext, DEFAULT_BAND_OFFSET_M, DEFAULT_BASELINE_YEARS};

/// File read when neither `--config` nor `BIRDRISK_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "birdrisk.toml";
pub const CONFIG_PATH_ENV: &str = "BIRDRISK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root of birdrisk.toml. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub source: SourceSettings,
    pub pipeline: PipelineSettings,
    /// Used when the warehouse is not configured or unreachable.
    #[serde(rename = "station")]
    pub stations: Vec<StationContext>,
}

/// Where vpts files come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Height of the critical band above station elevation, meters.
    pub band_offset_m: f64,
    /// Prior years pooled into the baseline.
    pub baseline_years: u32,
    /// How many days behind today the archive is considered complete.
    pub data_latency_days: u32,
    /// Concurrent baseline fetches.
    pub fetch_workers: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            band_offset_m: DEFAULT_BAND_OFFSET_M,
            baseline_years: DEFAULT_BASELINE_YEARS,
            data_latency_days: 3,
            fetch_workers: 3,
        }
    }
}

impl PipelineSettings {
    /// Checks the pipeline knobs. Also run after command-line overrides,
    /// which are applied once the file has been validated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.band_offset_m.is_finite() || self.band_offset_m < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pipeline.band_offset_m must be a non-negative number, got {}",
                self.band_offset_m
            )));
        }
        if self.fetch_workers == 0 {
            return Err(ConfigError::Invalid("pipeline.fetch_workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.base_url must not be empty".to_string()));
        }
        for station in &self.stations {
            if station.station_id.is_empty() {
                return Err(ConfigError::Invalid("station entry with empty station_id".to_string()));
            }
            if !(-90.0..=90.0).contains(&station.latitude) || !(-180.0..=180.0).contains(&station.longitude) {
                return Err(ConfigError::Invalid(format!(
                    "station {} has coordinates out of range",
                    station.station_id
                )));
            }
        }
        Ok(())
    }
}

/// Resolves the config path: explicit argument, then `BIRDRISK_CONFIG`,
/// then `birdrisk.toml` in the working directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the service configuration.
///
/// A missing file at the *default* location is not an error: the service
/// runs on built-in defaults. A missing file that was asked for explicitly
/// is.
pub fn load_config(explicit: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let path = resolve_config_path(explicit);
    let asked_for = explicit.is_some() || std::env::var_os(CONFIG_PATH_ENV).is_some();

    match fs::read_to_string(&path) {
        Ok(contents) => ServiceConfig::from_toml_str(&contents, &path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !asked_for => {
            log::info!("{} not found, using built-in defaults", path.display());
            Ok(ServiceConfig::default())
        }
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}
