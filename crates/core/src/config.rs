//! Application configuration handling.
//!
//! Settings are layered: built-in defaults, then `config.toml` under the
//! user's config directory, then `ALMANAC_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::DataSource;

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "uw4-almanac";
/// Prefix for environment overrides (e.g. `ALMANAC_ITEM_PAGE_SIZE`).
pub const ENV_PREFIX: &str = "ALMANAC";

const DEFAULT_ITEM_PAGE_SIZE: i64 = 20;
const DEFAULT_ROUTE_PAGE_SIZE: i64 = 15;
const DEFAULT_CREW_PAGE_SIZE: i64 = 20;
const DEFAULT_HIGH_VALUE_THRESHOLD: i64 = 500;

/// Runtime configuration for the almanac.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory or `http(s)://` base URL holding the JSON datasets.
    pub data_source: String,
    /// Directory backing the key-value store (board posts, acquired items).
    pub storage_root: PathBuf,
    /// Sheet of the trade-route workbook export to read.
    #[serde(default)]
    pub trade_route_sheet: Option<String>,
    /// Rows per page in the item search view.
    pub item_page_size: usize,
    /// Rows per page in the trade-route table.
    pub route_page_size: usize,
    /// Rows per page in the companion view.
    pub crew_page_size: usize,
    /// Prices at or above this value are flagged as high value.
    pub high_value_threshold: i64,
    /// Reload datasets when files in a directory source change.
    pub watch_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_source: default_data_dir().to_string_lossy().into_owned(),
            storage_root: default_storage_root(),
            trade_route_sheet: None,
            item_page_size: DEFAULT_ITEM_PAGE_SIZE as usize,
            route_page_size: DEFAULT_ROUTE_PAGE_SIZE as usize,
            crew_page_size: DEFAULT_CREW_PAGE_SIZE as usize,
            high_value_threshold: DEFAULT_HIGH_VALUE_THRESHOLD,
            watch_data: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) layered over the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("data_source", defaults.data_source.clone())?
            .set_default(
                "storage_root",
                defaults.storage_root.to_string_lossy().into_owned(),
            )?
            .set_default("item_page_size", DEFAULT_ITEM_PAGE_SIZE)?
            .set_default("route_page_size", DEFAULT_ROUTE_PAGE_SIZE)?
            .set_default("crew_page_size", DEFAULT_CREW_PAGE_SIZE)?
            .set_default("high_value_threshold", DEFAULT_HIGH_VALUE_THRESHOLD)?
            .set_default("watch_data", defaults.watch_data)?
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("invalid configuration values")?;
        config.item_page_size = config.item_page_size.max(1);
        config.route_page_size = config.route_page_size.max(1);
        config.crew_page_size = config.crew_page_size.max(1);
        Ok(config)
    }

    /// Parsed dataset source.
    pub fn source(&self) -> DataSource {
        DataSource::parse(&self.data_source)
    }
}

/// Path of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Default directory the datasets are read from.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("db")
}

/// Default root of the key-value store.
pub fn default_storage_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("storage")
}

/// Write a config file populated with defaults if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

/// Write the default configuration to `path` unless a file is already there.
pub fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        r#"# Directory or http(s):// base URL holding the JSON datasets.
data_source = {data_source:?}
# Directory used for board posts and acquired items.
storage_root = {storage_root:?}
# trade_route_sheet = "Sheet1"
item_page_size = {item}
route_page_size = {route}
crew_page_size = {crew}
high_value_threshold = {threshold}
watch_data = {watch}
"#,
        data_source = defaults.data_source,
        storage_root = defaults.storage_root.to_string_lossy(),
        item = defaults.item_page_size,
        route = defaults.route_page_size,
        crew = defaults.crew_page_size,
        threshold = defaults.high_value_threshold,
        watch = defaults.watch_data,
    );
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.route_page_size, 15);
        assert_eq!(config.high_value_threshold, 500);
        assert!(config.trade_route_sheet.is_none());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            concat!(
                "data_source = \"https://example.com/db\"\n",
                "item_page_size = 0\n",
                "trade_route_sheet = \"Prices\"\n",
            ),
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.item_page_size, 1);
        assert_eq!(config.trade_route_sheet.as_deref(), Some("Prices"));
        assert!(matches!(config.source(), DataSource::Remote(_)));
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.crew_page_size, 20);
        assert!(config.watch_data);
        Ok(())
    }
}
