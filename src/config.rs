use serde::{Deserialize, Serialize};
use std::{
  env, fs,
  path::{Path, PathBuf},
};

use crate::error::ConfigError;
use crate::types::DEFAULT_SIMULATION_NAME;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
  /// Snapshot read at startup and written with `--write`.
  pub snapshot_path: String,
  pub log_dir: String,
  /// Name given to a simulation that starts without a snapshot.
  pub default_simulation_name: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    AppConfig {
      snapshot_path: String::new(),
      log_dir: String::new(),
      default_simulation_name: DEFAULT_SIMULATION_NAME.to_string(),
    }
  }
}

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  match env_default("WC26_SIM_CONFIG_PATH") {
    Some(raw) => resolve_repo_path(&raw),
    None => repo_root().join("config.json"),
  }
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  if config.snapshot_path.trim().is_empty() {
    if let Some(value) = env_default("WC26_SIM_SNAPSHOT_PATH") {
      config.snapshot_path = value;
    }
  }
  if config.log_dir.trim().is_empty() {
    if let Some(value) = env_default("WC26_SIM_LOG_DIR") {
      config.log_dir = value;
    }
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, ConfigError> {
  load_config_from(&config_path()).map(apply_env_defaults)
}

/// Read a config file as-is. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
  if !path.is_file() {
    return Ok(AppConfig::default());
  }
  let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str::<AppConfig>(&data).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

pub fn save_config_inner(config: AppConfig) -> Result<AppConfig, ConfigError> {
  save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: AppConfig) -> Result<AppConfig, ConfigError> {
  let payload = serde_json::to_string_pretty(&config)?;
  fs::write(path, payload).map_err(|source| ConfigError::Write {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(config)
}

pub fn snapshot_path(config: &AppConfig) -> PathBuf {
  let trimmed = config.snapshot_path.trim();
  if trimmed.is_empty() {
    repo_root().join("simulation.json")
  } else {
    resolve_repo_path(trimmed)
  }
}

pub fn log_dir(config: &AppConfig) -> PathBuf {
  let trimmed = config.log_dir.trim();
  if trimmed.is_empty() {
    repo_root().join("logs")
  } else {
    resolve_repo_path(trimmed)
  }
}

pub fn load_env_file() {
  load_env_file_from(&repo_root().join(".env"));
}

/// Export `KEY=value` lines without overriding variables already set.
pub fn load_env_file_from(env_path: &Path) {
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn log_env_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();

  if config.snapshot_path.trim().is_empty() {
    warnings.push("WC26_SIM_SNAPSHOT_PATH not set and no snapshot path in config; using simulation.json");
  }
  if config.default_simulation_name.trim().is_empty() {
    warnings.push("defaultSimulationName is empty in config; new simulations will be unnamed");
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}
