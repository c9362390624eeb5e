//! Dataset loading and the session cache.
//!
//! A [`DatasetLoader`] reads the static JSON documents from a data directory
//! or an HTTP base URL. Parsed datasets are kept in a [`DatasetCache`] for
//! the rest of the session; only [`DatasetLoader::reload`] empties it.

mod watch;

pub use watch::{DataEvent, DataWatcher};

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    path::PathBuf,
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::LoadError;

/// Where the dataset documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A local directory holding the JSON files.
    Directory(PathBuf),
    /// An `http(s)://` base URL the files are fetched from.
    Remote(String),
}

impl DataSource {
    /// Interpret a configured source string.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.trim_end_matches('/').to_string())
        } else {
            DataSource::Directory(PathBuf::from(trimmed))
        }
    }

    /// Local directory, when the source is one.
    pub fn directory(&self) -> Option<&PathBuf> {
        match self {
            DataSource::Directory(dir) => Some(dir),
            DataSource::Remote(_) => None,
        }
    }

    fn url_for(base: &str, file_name: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), file_name)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Directory(dir) => write!(f, "{}", dir.display()),
            DataSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Options applied while parsing datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Sheet of the trade-route workbook to read; first sheet when unset.
    pub trade_route_sheet: Option<String>,
}

/// A document the loader knows how to fetch and parse.
pub trait Dataset: Sized + Send + Sync + 'static {
    /// Human readable name used in errors and logs.
    const NAME: &'static str;
    /// File name relative to the data source.
    const FILE_NAME: &'static str;

    /// Parse the raw document. Must reject the whole document on any
    /// structural problem.
    fn parse(bytes: &[u8], options: &LoadOptions) -> Result<Self, LoadError>;
}

/// Parsed datasets for the current session, keyed by type.
///
/// Clones share the same storage. There is no eviction; the cache is only
/// emptied by [`DatasetCache::clear`], which also starts a new epoch.
#[derive(Clone, Default)]
pub struct DatasetCache {
    state: Arc<RwLock<CacheState>>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    epoch: u64,
}

impl DatasetCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dataset of type `T`.
    pub fn get<T: Dataset>(&self) -> Option<Arc<T>> {
        let entry = self.state.read().entries.get(&TypeId::of::<T>()).cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Store `dataset`, replacing any previous value of the same type.
    pub fn insert<T: Dataset>(&self, dataset: Arc<T>) {
        self.state.write().entries.insert(TypeId::of::<T>(), dataset);
    }

    /// Store `dataset` only if the cache has not been cleared since `epoch`.
    /// Returns whether it was stored.
    pub fn insert_if_current<T: Dataset>(&self, epoch: u64, dataset: Arc<T>) -> bool {
        let mut state = self.state.write();
        if state.epoch != epoch {
            return false;
        }
        state.entries.insert(TypeId::of::<T>(), dataset);
        true
    }

    /// Drop every cached dataset and start a new epoch.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// Counter bumped by every [`DatasetCache::clear`].
    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    /// Number of cached datasets.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }
}

impl fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetCache")
            .field("entries", &self.len())
            .field("epoch", &self.epoch())
            .finish()
    }
}

/// Fetches datasets from a [`DataSource`], caching parsed results.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    source: DataSource,
    options: LoadOptions,
    cache: DatasetCache,
    client: reqwest::Client,
}

impl DatasetLoader {
    /// Loader with its own empty cache.
    pub fn new(source: DataSource, options: LoadOptions) -> Self {
        Self::with_cache(source, options, DatasetCache::new())
    }

    /// Loader sharing an existing cache.
    pub fn with_cache(source: DataSource, options: LoadOptions, cache: DatasetCache) -> Self {
        Self {
            source,
            options,
            cache,
            client: reqwest::Client::new(),
        }
    }

    /// Source the datasets are read from.
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Cache used by this loader.
    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Return dataset `T`, fetching and parsing it on first use.
    ///
    /// A result fetched across a [`DatasetLoader::reload`] is returned to the
    /// caller but not cached, so the next `load` reads the source again.
    pub async fn load<T: Dataset>(&self) -> Result<Arc<T>, LoadError> {
        if let Some(cached) = self.cache.get::<T>() {
            debug!(dataset = T::NAME, "dataset cache hit");
            return Ok(cached);
        }
        let epoch = self.cache.epoch();
        let dataset = Arc::new(self.fetch::<T>().await?);
        if !self.cache.insert_if_current(epoch, Arc::clone(&dataset)) {
            debug!(dataset = T::NAME, "cache cleared during fetch, not caching");
        }
        Ok(dataset)
    }

    /// Fetch and parse dataset `T` without consulting the cache.
    pub async fn fetch<T: Dataset>(&self) -> Result<T, LoadError> {
        let bytes = self.read(T::FILE_NAME).await?;
        let dataset = T::parse(&bytes, &self.options)?;
        info!(
            dataset = T::NAME,
            source = %self.source,
            bytes = bytes.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Forget every cached dataset so the next `load` fetches again.
    pub fn reload(&self) {
        info!(cached = self.cache.len(), "clearing dataset cache");
        self.cache.clear();
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>, LoadError> {
        match &self.source {
            DataSource::Directory(dir) => {
                let path = dir.join(file_name);
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| LoadError::Io { path, source })
            }
            DataSource::Remote(base) => {
                let url = DataSource::url_for(base, file_name);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|source| LoadError::Http {
                        url: url.clone(),
                        source,
                    })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|source| LoadError::Http { url, source })?;
                Ok(bytes.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::{CrewRoster, ItemCatalog};
    use anyhow::Result;
    use tempfile::tempdir;

    const ITEMS: &str = r#"[{"인덱스": "item_w_001", "이름": "커틀러스", "효과": 10}]"#;

    #[test]
    fn parses_sources() {
        assert_eq!(
            DataSource::parse("https://example.com/db/"),
            DataSource::Remote("https://example.com/db".to_string())
        );
        assert_eq!(
            DataSource::parse(" ./db "),
            DataSource::Directory(PathBuf::from("./db"))
        );
        assert_eq!(
            DataSource::url_for("https://example.com/db", "dh4_ver4.json"),
            "https://example.com/db/dh4_ver4.json"
        );
    }

    #[tokio::test]
    async fn caches_until_reload() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(ItemCatalog::FILE_NAME), ITEMS)?;
        let loader = DatasetLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            LoadOptions::default(),
        );

        let first = loader.load::<ItemCatalog>().await?;
        let second = loader.load::<ItemCatalog>().await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cache().len(), 1);

        // Changes on disk are only seen after a reload.
        std::fs::write(dir.path().join(ItemCatalog::FILE_NAME), "[]")?;
        assert_eq!(loader.load::<ItemCatalog>().await?.len(), 1);
        loader.reload();
        assert!(loader.cache().is_empty());
        assert!(loader.load::<ItemCatalog>().await?.is_empty());
        Ok(())
    }

    #[test]
    fn clear_starts_a_new_epoch() {
        let cache = DatasetCache::new();
        let before = cache.epoch();
        cache.clear();
        assert_ne!(cache.epoch(), before);

        let catalog = Arc::new(ItemCatalog::new(Vec::new()));
        assert!(!cache.insert_if_current(before, Arc::clone(&catalog)));
        assert!(cache.is_empty());
        assert!(cache.insert_if_current(cache.epoch(), catalog));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn load_spanning_reload_is_not_cached() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(ItemCatalog::FILE_NAME);
        std::fs::write(&path, ITEMS)?;
        let loader = DatasetLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            LoadOptions::default(),
        );

        // Start a load, then reload before it is driven to completion.
        let pending = loader.load::<ItemCatalog>();
        tokio::pin!(pending);
        let mut finished = None;
        tokio::select! {
            biased;
            result = &mut pending => finished = Some(result),
            _ = std::future::ready(()) => {}
        }
        std::fs::write(&path, r#"[{"인덱스": "item_w_002", "이름": "레이피어"}]"#)?;
        loader.reload();
        match finished {
            Some(result) => result?,
            None => pending.await?,
        };

        assert!(loader.cache().get::<ItemCatalog>().is_none());
        let fresh = loader.load::<ItemCatalog>().await?;
        assert!(fresh.get("item_w_002").is_some());
        assert!(fresh.get("item_w_001").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failures_leave_cache_untouched() -> Result<()> {
        let dir = tempdir()?;
        let loader = DatasetLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            LoadOptions::default(),
        );
        let err = loader.load::<CrewRoster>().await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));

        std::fs::write(dir.path().join(CrewRoster::FILE_NAME), "{broken")?;
        let err = loader.load::<CrewRoster>().await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(loader.cache().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn clones_share_the_cache() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(ItemCatalog::FILE_NAME), ITEMS)?;
        let loader = DatasetLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            LoadOptions::default(),
        );
        let clone = loader.clone();
        clone.load::<ItemCatalog>().await?;
        assert!(loader.cache().get::<ItemCatalog>().is_some());
        assert!(loader.cache().get::<CrewRoster>().is_none());
        Ok(())
    }
}
