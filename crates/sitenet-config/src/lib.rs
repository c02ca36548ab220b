//! Shared configuration for the sitenet CLI.
//!
//! A TOML file under the platform config directory, overlaid with
//! `SITENET_`-prefixed environment variables, translated into the runtime
//! `sitenet_core::SyncConfig` and `sitenet_core::TopologyConfig`.
//!
//! Nested keys are addressed with a double underscore, e.g.
//! `SITENET_SYNC__DEADLINE_SECS=10`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitenet_core::{SyncConfig, TopologyConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Config {
    /// Project code used when `--project` is omitted.
    pub default_project: Option<u8>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub topology: TopologySection,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// State file used when `--state` is omitted.
    pub state_file: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            state_file: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncSection {
    /// Per-snapshot processing budget.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_deadline_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TopologySection {
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    #[serde(default = "default_horizontal_spacing")]
    pub horizontal_spacing: f64,

    #[serde(default = "default_vertical_spacing")]
    pub vertical_spacing: f64,
}

impl Default for TopologySection {
    fn default() -> Self {
        Self {
            root_marker: default_root_marker(),
            horizontal_spacing: default_horizontal_spacing(),
            vertical_spacing: default_vertical_spacing(),
        }
    }
}

fn default_root_marker() -> String {
    TopologyConfig::default().root_marker
}
fn default_horizontal_spacing() -> f64 {
    TopologyConfig::default().horizontal_spacing
}
fn default_vertical_spacing() -> f64 {
    TopologyConfig::default().vertical_spacing
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LogSection {
    #[serde(default)]
    pub format: LogFormat,
}

// ── Translation to runtime config ───────────────────────────────────

impl Config {
    /// Validate and build the reconciler's runtime config.
    pub fn to_sync_config(&self) -> Result<SyncConfig, ConfigError> {
        if self.sync.deadline_secs == 0 {
            return Err(ConfigError::Validation {
                field: "sync.deadline_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(SyncConfig {
            snapshot_deadline: Duration::from_secs(self.sync.deadline_secs),
        })
    }

    /// Validate and build the topology builder's runtime config.
    pub fn to_topology_config(&self) -> Result<TopologyConfig, ConfigError> {
        let t = &self.topology;
        if t.root_marker.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "topology.root_marker".into(),
                reason: "must not be blank".into(),
            });
        }
        for (field, value) in [
            ("topology.horizontal_spacing", t.horizontal_spacing),
            ("topology.vertical_spacing", t.vertical_spacing),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        Ok(TopologyConfig {
            root_marker: t.root_marker.trim().to_owned(),
            horizontal_spacing: t.horizontal_spacing,
            vertical_spacing: t.vertical_spacing,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "sitenet", "sitenet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default state file location, under the platform data directory.
pub fn state_path() -> PathBuf {
    ProjectDirs::from("dev", "sitenet", "sitenet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("state.json");
            p
        },
        |dirs| dirs.data_dir().join("state.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitenet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from an explicit file + environment. A missing file
/// contributes nothing.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SITENET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
