//! Configuration system for irisshap.
//!
//! Uses `figment` for layered configuration: defaults -> user config ->
//! workspace config -> explicit file -> environment -> CLI overrides.

use crate::error::ConfigError;
use crate::normalize::NormalizationMode;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the workspace-level config directory.
pub const WORKSPACE_DIR: &str = ".irisshap";
/// Prefix of environment overrides, e.g. `IRISSHAP_DASHBOARD__PORT`.
pub const ENV_PREFIX: &str = "IRISSHAP_";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Attribution table written by the pipeline and read by the dashboard.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            pipeline: PipelineConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("shap.csv")
}

/// Training and explanation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seed of the train/test shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fraction of records held out for explanation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Fitting budget of the booster; larger values grow more trees.
    #[serde(default = "default_budget")]
    pub budget: f32,
}

fn default_seed() -> u64 {
    1000
}
fn default_test_fraction() -> f64 {
    0.25
}
fn default_budget() -> f32 {
    1.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            test_fraction: default_test_fraction(),
            budget: default_budget(),
        }
    }
}

/// Dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How the non-negative view is derived.
    #[serde(default)]
    pub normalization: NormalizationMode,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8050
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            normalization: NormalizationMode::default(),
        }
    }
}

impl AppConfig {
    /// Return a list of problems; empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let p = &self.pipeline;
        if !(p.test_fraction > 0.0 && p.test_fraction < 1.0) {
            problems.push(format!(
                "pipeline.test_fraction must be in (0, 1), got {}",
                p.test_fraction
            ));
        }
        if p.budget.is_nan() || p.budget <= 0.0 {
            problems.push(format!("pipeline.budget must be positive, got {}", p.budget));
        }
        if self.dashboard.host.trim().is_empty() {
            problems.push("dashboard.host must not be empty".to_string());
        }
        problems
    }

    /// Render as TOML, as written by `config init`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

/// Values set on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub normalization: Option<NormalizationMode>,
    pub seed: Option<u64>,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "irisshap", "irisshap")
}

/// User-level config file, e.g. `~/.config/irisshap/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Workspace-level config file, `<workspace>/.irisshap/config.toml`.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_DIR).join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `IRISSHAP_`, `__` between sections)
/// 3. Explicit config file (`--config`)
/// 4. Workspace-local config (`.irisshap/config.toml`)
/// 5. User config (`~/.config/irisshap/config.toml`)
/// 6. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(data_file) = &overrides.data_file {
        figment = figment.merge(Serialized::default("data_file", data_file));
    }
    if let Some(host) = &overrides.host {
        figment = figment.merge(Serialized::default("dashboard.host", host));
    }
    if let Some(port) = overrides.port {
        figment = figment.merge(Serialized::default("dashboard.port", port));
    }
    if let Some(mode) = overrides.normalization {
        figment = figment.merge(Serialized::default("dashboard.normalization", mode));
    }
    if let Some(seed) = overrides.seed {
        figment = figment.merge(Serialized::default("pipeline.seed", seed));
    }

    let config: AppConfig = figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;

    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ConfigError::Invalid {
            message: problems.join("; "),
        });
    }
    Ok(config)
}

/// Write the default configuration to `<workspace>/.irisshap/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set. Returns the
/// path written.
pub fn init_workspace_config(workspace: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = workspace_config_path(workspace);
    if path.exists() && !force {
        return Err(ConfigError::Invalid {
            message: format!("{} already exists (use --force to replace it)", path.display()),
        });
    }
    let io_err = |e: std::io::Error| ConfigError::Invalid {
        message: format!("Failed to write {}: {e}", path.display()),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&path, AppConfig::default().to_toml()?).map_err(io_err)?;
    Ok(path)
}
