//! Application-level configuration loading: storage location, default race
//! targets, roster seed and the remote detection source.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{roster::DEFAULT_SEED_NAMES, table::{MAX_RACE_TO, MIN_RACE_TO}};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BARAKO_SCOREBOARD_CONFIG_PATH";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MATCH_RACE_TO: u32 = 9;
const DEFAULT_RING_RACE_TO: u32 = 7;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    data_dir: PathBuf,
    match_race_to: u32,
    ring_race_to: u32,
    roster_seed: Vec<String>,
    detection: Option<DetectionSourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Remote document polled for ball detections.
pub struct DetectionSourceConfig {
    /// URL returning `{ "detectedBalls": [..] }`.
    pub url: String,
    /// Delay between two fetches.
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        data_dir = %app_config.data_dir.display(),
                        detection = app_config.detection.is_some(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Directory used by the file store.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Race target of a freshly created 2-player match.
    pub fn match_race_to(&self) -> u32 {
        self.match_race_to
    }

    /// Race target of a freshly created ring game.
    pub fn ring_race_to(&self) -> u32 {
        self.ring_race_to
    }

    /// Names used to seed an empty roster.
    pub fn roster_seed(&self) -> &[String] {
        &self.roster_seed
    }

    /// Remote detection source, when configured.
    pub fn detection(&self) -> Option<&DetectionSourceConfig> {
        self.detection.as_ref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            match_race_to: DEFAULT_MATCH_RACE_TO,
            ring_race_to: DEFAULT_RING_RACE_TO,
            roster_seed: default_seed(),
            detection: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    data_dir: Option<PathBuf>,
    match_race_to: Option<u32>,
    ring_race_to: Option<u32>,
    roster_seed: Option<Vec<String>>,
    detection: Option<RawDetection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetection {
    url: String,
    poll_interval_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let clamp = |race_to: u32| race_to.clamp(MIN_RACE_TO, MAX_RACE_TO);
        Self {
            data_dir: value
                .data_dir
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            match_race_to: value.match_race_to.map_or(DEFAULT_MATCH_RACE_TO, clamp),
            ring_race_to: value.ring_race_to.map_or(DEFAULT_RING_RACE_TO, clamp),
            roster_seed: value
                .roster_seed
                .filter(|names| !names.is_empty())
                .unwrap_or_else(default_seed),
            detection: value
                .detection
                .filter(|detection| !detection.url.trim().is_empty())
                .map(|detection| DetectionSourceConfig {
                    url: detection.url,
                    poll_interval: Duration::from_millis(
                        detection
                            .poll_interval_ms
                            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                            .max(MIN_POLL_INTERVAL_MS),
                    ),
                }),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn default_seed() -> Vec<String> {
    DEFAULT_SEED_NAMES.iter().map(|name| name.to_string()).collect()
}
