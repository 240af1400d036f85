use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use kpi_domain::RuntimeConfig;

use crate::config::{validate_log_level, validate_window_days};

const MAX_WINDOW_DAYS: u32 = 365;
const MAX_RECENT_EXECUTIONS: usize = 1000;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub indicators_path: String,
    pub history_path: String,
    pub alerts_path: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub trend_days_back: u32,
    pub prediction_days_ahead: u32,
    pub recent_execution_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            indicators_path: "./indicators.yaml".to_string(),
            history_path: "./history.json".to_string(),
            alerts_path: "./alerts.json".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            trend_days_back: runtime.trend_days_back,
            prediction_days_ahead: runtime.prediction_days_ahead,
            recent_execution_limit: runtime.recent_execution_limit,
        }
    }
}

impl AppConfig {
    /// Reads `KPI_CONFIG` (default `./config.toml`) and applies `KPI_*` overrides.
    pub async fn load() -> Result<Self> {
        let path = env::var("KPI_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path, |key| env::var(key).ok()).await
    }

    pub async fn load_from(path: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("failed to read {}", path))?;
            toml::from_str(&content).with_context(|| format!("failed to parse {}", path))?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_overrides(lookup);
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
        self.log_level = self.log_level.trim().to_string();
        if self.log_level.is_empty() {
            self.log_level = "info".to_string();
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.indicators_path = resolve_path(base, &self.indicators_path);
        self.history_path = resolve_path(base, &self.history_path);
        self.alerts_path = resolve_path(base, &self.alerts_path);
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.indicators_path.trim().is_empty() {
            return Err(anyhow!("indicators_path must not be empty"));
        }
        validate_log_level(&self.log_level)?;
        validate_window_days("trend_days_back", self.trend_days_back, MAX_WINDOW_DAYS)?;
        validate_window_days(
            "prediction_days_ahead",
            self.prediction_days_ahead,
            MAX_WINDOW_DAYS,
        )?;
        if self.recent_execution_limit == 0 || self.recent_execution_limit > MAX_RECENT_EXECUTIONS {
            return Err(anyhow!(
                "recent_execution_limit must be between 1 and {}",
                MAX_RECENT_EXECUTIONS
            ));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            trend_days_back: self.trend_days_back,
            prediction_days_ahead: self.prediction_days_ahead,
            recent_execution_limit: self.recent_execution_limit,
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("KPI_INDICATORS_PATH") {
            self.indicators_path = value;
        }
        if let Some(value) = lookup("KPI_HISTORY_PATH") {
            self.history_path = value;
        }
        if let Some(value) = lookup("KPI_ALERTS_PATH") {
            self.alerts_path = value;
        }
        if let Some(value) = lookup("KPI_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("KPI_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = lookup("KPI_TREND_DAYS_BACK") {
            self.trend_days_back = value.parse().unwrap_or(self.trend_days_back);
        }
        if let Some(value) = lookup("KPI_PREDICTION_DAYS_AHEAD") {
            self.prediction_days_ahead = value.parse().unwrap_or(self.prediction_days_ahead);
        }
        if let Some(value) = lookup("KPI_RECENT_EXECUTION_LIMIT") {
            self.recent_execution_limit = value.parse().unwrap_or(self.recent_execution_limit);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
