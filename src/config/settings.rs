use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ServiceType;

fn default_church_name() -> String {
    "Grace Community Church".to_string()
}
fn default_currency_symbol() -> String {
    "$".to_string()
}
fn default_service() -> ServiceType {
    ServiceType::SundayMorning
}
fn default_receipt_prefix() -> String {
    "DON".to_string()
}
fn default_checkin_poll_secs() -> u64 {
    10
}
fn default_tick_rate_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchConfig {
    #[serde(default = "default_church_name")]
    pub name: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Service used for check-ins when none is given.
    #[serde(default = "default_service")]
    pub default_service: ServiceType,
}

impl Default for ChurchConfig {
    fn default() -> Self {
        Self {
            name: default_church_name(),
            currency_symbol: default_currency_symbol(),
            default_service: default_service(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    #[serde(default = "default_receipt_prefix")]
    pub receipt_prefix: String,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            receipt_prefix: default_receipt_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How often the check-in screen reloads today's attendance.
    #[serde(default = "default_checkin_poll_secs")]
    pub checkin_poll_secs: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            checkin_poll_secs: default_checkin_poll_secs(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub church: ChurchConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "flock").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("flock.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        log::debug!("saved config to {:?}", path);
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.finance.receipt_prefix, "DON");
        assert_eq!(config.dashboard.checkin_poll_secs, 10);
    }

    #[test]
    fn saved_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.church.name = "St. Brendan's".into();
        config.church.currency_symbol = "€".into();
        config.church.default_service = ServiceType::Midweek;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[church]\nname = \"Hillside\"\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.church.name, "Hillside");
        assert_eq!(config.church.currency_symbol, "$");
        assert_eq!(config.dashboard.tick_rate_ms, 500);
    }
}
