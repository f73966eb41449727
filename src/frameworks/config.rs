use crate::domain::Area;
use serde::Deserialize;
use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

// Runtime constants (not vehicle tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

const DEFAULT_CONFIG_PATH: &str = "uav_sim.toml";

/// Simulation area and loop rates.
///
/// Resolved in layers: built-in defaults, then the TOML file named by
/// `UAV_SIM_CONFIG` (or `uav_sim.toml` when present), then `UAV_SIM_*`
/// environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimSettings {
    pub width: f64,
    pub height: f64,
    /// Physics ticks per second.
    pub tick_rate: u32,
    /// Snapshot frames per second on the output feed.
    pub frame_rate: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            tick_rate: 60,
            frame_rate: 60,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    InvalidValue { key: &'static str, value: String },
    InvalidArea { width: f64, height: f64 },
    ZeroRate { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid config file: {e}"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value {value:?} for {key}")
            }
            ConfigError::InvalidArea { width, height } => {
                write!(f, "simulation area {width}x{height} must be positive and finite")
            }
            ConfigError::ZeroRate { key } => write!(f, "{key} must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl SimSettings {
    /// Resolves settings from the process environment and optional file.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("UAV_SIM_CONFIG").ok().map(PathBuf::from);
        let mut settings = Self::from_file_layer(explicit, Path::new(DEFAULT_CONFIG_PATH))?;
        settings.apply_env_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads `explicit` if given, else `default_path`. Only a missing default
    /// file falls back to built-in defaults.
    fn from_file_layer(explicit: Option<PathBuf>, default_path: &Path) -> Result<Self, ConfigError> {
        let is_explicit = explicit.is_some();
        let path = explicit.unwrap_or_else(|| default_path.to_path_buf());

        match fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !is_explicit => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_with(&lookup, "UAV_SIM_WIDTH", &mut self.width)?;
        override_with(&lookup, "UAV_SIM_HEIGHT", &mut self.height)?;
        override_with(&lookup, "UAV_SIM_TICK_RATE", &mut self.tick_rate)?;
        override_with(&lookup, "UAV_SIM_FRAME_RATE", &mut self.frame_rate)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(ConfigError::InvalidArea {
                width: self.width,
                height: self.height,
            });
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroRate { key: "tick_rate" });
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroRate { key: "frame_rate" });
        }
        Ok(())
    }

    pub fn area(&self) -> Area {
        Area::new(self.width, self.height)
    }

    pub fn tick_interval(&self) -> Duration {
        interval_for(self.tick_rate)
    }

    pub fn frame_interval(&self) -> Duration {
        interval_for(self.frame_rate)
    }
}

// Whole milliseconds per step, never below 1 ms.
fn interval_for(rate: u32) -> Duration {
    let millis = 1000 / u64::from(rate.max(1));
    Duration::from_millis(millis.max(1))
}

fn override_with<F, T>(lookup: &F, key: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(value) = lookup(key) else {
        return Ok(());
    };
    *slot = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })?;
    Ok(())
}
