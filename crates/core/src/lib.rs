#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Uncharted Waters IV almanac.
//!
//! This crate hosts the dataset models, the shared search pipeline
//! (filter, rank, paginate), dataset loading and caching, the acquired-item
//! tracker, the bulletin board, and the key-value persistence used by the
//! terminal UI and any future frontends.

pub mod board;
pub mod config;
pub mod datasets;
pub mod error;
pub mod loader;
pub mod progress;
pub mod query;
pub mod store;
pub mod view;

pub use board::{BoardManager, BoardSort, Post, PostDraft};
pub use config::AppConfig;
pub use datasets::{
    Category, CharacterGroup, Companion, CrewRoster, Item, ItemCatalog, ItemCriteria, Protagonist,
    RouteCriteria, RouteTable, SpecialCompanion, TradeRoute,
};
pub use error::{BoardError, LoadError, StoreError, TrackerError};
pub use loader::{
    DataEvent, DataSource, DataWatcher, Dataset, DatasetCache, DatasetLoader, LoadOptions,
};
pub use progress::{AcquiredSet, AcquiredTracker, Progress};
pub use query::{Criteria, Highlighter, PageView, Pager, SearchTerm, SortPolicy};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use view::{PageSnapshot, Presenter, SearchView};
