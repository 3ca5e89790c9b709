use crate::error::Result;
use crate::sensors::WalkConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load `.env` from the working directory into the process environment.
///
/// Variables already set in the environment win. Must run before the async
/// runtime starts, while the process is still single-threaded.
///
/// Returns the number of variables set.
pub fn load_dotenv() -> usize {
    let Ok(content) = fs::read_to_string(Path::new(".env")) else {
        return 0;
    };

    let mut loaded = 0;
    for (key, value) in content.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(key).is_none() {
            // SAFETY: no other threads exist yet (see above)
            unsafe { std::env::set_var(key, value) };
            loaded += 1;
        }
    }
    loaded
}

/// Parse one `.env` line into a key/value pair.
///
/// Accepts an optional `export ` prefix and single or double quotes around
/// the value. Unquoted values may carry a trailing ` # comment`.
fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q));
    let value = match unquoted {
        Some(inner) => inner,
        None => value.split(" #").next().unwrap_or(value).trim_end(),
    };
    Some((key, value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sensor: SensorConfig,
    pub storage: StorageConfig,
}

/// Raw sensor settings. Validated by [`SensorConfig::to_walk_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub min: i32,
    pub max: i32,
    pub start: i32,
    pub step_bound: i32,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl SensorConfig {
    pub fn to_walk_config(&self) -> Result<WalkConfig> {
        WalkConfig::new(
            self.min,
            self.max,
            self.start,
            self.step_bound,
            Duration::from_millis(self.interval_ms),
        )
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        let preset = WalkConfig::heartbeat();
        Self {
            min: preset.min(),
            max: preset.max(),
            start: preset.start(),
            step_bound: preset.step_bound(),
            interval_ms: preset.interval().as_millis() as u64,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("heartbeat-board")
                .join("preferences.json"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(min) = parse_env("SENSOR_MIN") {
            config.sensor.min = min;
        }
        if let Some(max) = parse_env("SENSOR_MAX") {
            config.sensor.max = max;
        }
        if let Some(start) = parse_env("SENSOR_START") {
            config.sensor.start = start;
        }
        if let Some(step) = parse_env("SENSOR_STEP") {
            config.sensor.step_bound = step;
        }
        if let Some(interval) = parse_env("SENSOR_INTERVAL_MS") {
            config.sensor.interval_ms = interval;
        }

        if let Ok(path) = std::env::var("STORE_PATH") {
            config.storage.path = PathBuf::from(path);
        }

        config
    }
}
