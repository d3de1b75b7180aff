// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! The data manager handles access to every data frame used in a dashboard.
//!
//! A data source is either **static** (a data frame registered up front,
//! copied out on every load) or **dynamic** (a loader invoked on demand,
//! optionally with keyword-style arguments). Dynamic loads can be memoized
//! by an installed [`DataCache`], keyed by `(source name, canonical
//! arguments)` and aged out per-source via [`CacheTimeout`].
//!
//! The manager is an explicit context object: construct one per dashboard
//! build and share it behind an `Arc` afterwards. Registration happens
//! during the single-threaded build phase (`&mut self`); loads at runtime
//! are `&self` and the cache carries its own lock.
//!
//! # Example
//!
//! ```rust
//! use dashwire::data_manager::{DataManager, LoadArguments};
//! use dashwire::dataframe::{DataFrame, Value};
//!
//! let mut manager = DataManager::new();
//! let frame = DataFrame::new()
//!     .with_column("x", vec![Value::from(1.0)])
//!     .unwrap();
//! manager.register_static("points", frame).unwrap();
//! let loaded = manager.load("points").unwrap();
//! assert_eq!(loaded.row_count(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::dataframe::{DataFrame, Value};
use crate::error::{Error, Result};
use crate::models::ModelId;

/// Data source names are plain strings.
pub type DataSourceName = String;

// ============================================================================
// Load arguments
// ============================================================================

/// Keyword-style arguments for a dynamic loader.
///
/// Keys are kept sorted so the canonical form (and hence the cache key) is
/// independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadArguments {
    args: BTreeMap<String, Value>,
}

impl LoadArguments {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style argument insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Insert or replace an argument.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.args.insert(key.into(), value.into());
    }

    /// Look up an argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// True when no arguments are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Iterate over `(key, value)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.args.iter()
    }

    /// Canonical JSON form, stable across insertion orders.
    #[must_use]
    pub fn canonical(&self) -> String {
        // BTreeMap serializes in key order; failure cannot happen for the
        // Value grammar, so fall back to the empty object form.
        serde_json::to_string(&self.args).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Compose the cache key for one `(source, arguments)` load.
fn cache_key(name: &str, args: &LoadArguments) -> String {
    format!("{name}::{}", args.canonical())
}

// ============================================================================
// Loaders and sources
// ============================================================================

/// What a loader returns: a frame, or any error worth surfacing to the
/// requesting component.
pub type LoaderResult = std::result::Result<DataFrame, Box<dyn std::error::Error + Send + Sync>>;

/// A dynamic data loader: produces a fresh data frame on demand.
///
/// Loaders run synchronously on the invoking worker. A slow loader blocks
/// that worker for the duration of the load; there is no timeout around the
/// call itself.
pub trait DataLoader: Send + Sync {
    /// Produce the data frame for the given arguments.
    fn load(&self, args: &LoadArguments) -> LoaderResult;
}

impl<F> DataLoader for F
where
    F: Fn(&LoadArguments) -> LoaderResult + Send + Sync,
{
    fn load(&self, args: &LoadArguments) -> LoaderResult {
        self(args)
    }
}

/// Per-source cache expiry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTimeout {
    /// Use the installed cache's default timeout.
    #[default]
    Default,
    /// Entries never expire.
    Forever,
    /// Never cache this source; every load invokes the loader.
    Never,
    /// Entries expire after this many seconds.
    Seconds(u64),
}

/// A registered data source.
enum DataSource {
    /// A fixed frame; loads return an owned copy the caller may mutate.
    Static(DataFrame),
    /// A loader invoked on demand, with an expiry policy for cached results.
    Dynamic {
        loader: Arc<dyn DataLoader>,
        timeout: CacheTimeout,
    },
}

// ============================================================================
// Cache
// ============================================================================

/// Shared cache for dynamic data loads.
///
/// Implementations own their concurrency safety; the data manager only ever
/// calls these methods through a shared reference.
pub trait DataCache: Send + Sync {
    /// Return the cached frame for `key` if present and fresh under
    /// `timeout`.
    fn lookup(&self, key: &str, timeout: CacheTimeout) -> Option<DataFrame>;

    /// Store a frame under `key`, replacing any previous entry.
    fn store(&self, key: &str, frame: DataFrame);

    /// Drop every entry belonging to the named source.
    fn invalidate_source(&self, name: &str);

    /// Drop everything.
    fn clear(&self);
}

struct CacheEntry {
    frame: DataFrame,
    stored_at: Instant,
}

/// In-memory [`DataCache`] backed by a `HashMap` behind a lock.
///
/// Suitable for single-process dashboards, development and tests. Entries
/// past their timeout are dropped lazily on lookup; an optional maximum
/// size evicts the oldest entry on insert.
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_timeout: Duration,
    max_size: Option<usize>,
}

impl InMemoryCache {
    /// Default entry timeout when a source uses [`CacheTimeout::Default`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Unbounded cache with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_timeout: Self::DEFAULT_TIMEOUT,
            max_size: None,
        }
    }

    /// Override the default timeout applied to [`CacheTimeout::Default`]
    /// sources.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Cap the number of entries; the oldest entry is evicted on overflow.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, timeout: CacheTimeout) -> bool {
        let max_age = match timeout {
            CacheTimeout::Forever => return true,
            CacheTimeout::Never => return false,
            CacheTimeout::Default => self.default_timeout,
            CacheTimeout::Seconds(secs) => Duration::from_secs(secs),
        };
        entry.stored_at.elapsed() <= max_age
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCache for InMemoryCache {
    fn lookup(&self, key: &str, timeout: CacheTimeout) -> Option<DataFrame> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if self.is_fresh(entry, timeout) {
            Some(entry.frame.clone())
        } else {
            drop(entries);
            self.entries.write().remove(key);
            None
        }
    }

    fn store(&self, key: &str, frame: DataFrame) {
        let mut entries = self.entries.write();
        if let Some(max_size) = self.max_size {
            if entries.len() >= max_size && !entries.contains_key(key) {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                frame,
                stored_at: Instant::now(),
            },
        );
    }

    fn invalidate_source(&self, name: &str) {
        let prefix = format!("{name}::");
        self.entries.write().retain(|key, _| !key.starts_with(&prefix));
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}

// ============================================================================
// DataManager
// ============================================================================

/// Registry of named data sources, their component bindings and the shared
/// cache.
#[derive(Default)]
pub struct DataManager {
    sources: HashMap<DataSourceName, DataSource>,
    bindings: HashMap<ModelId, DataSourceName>,
    cache: Option<Arc<dyn DataCache>>,
}

impl DataManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static data frame under `name`.
    pub fn register_static(&mut self, name: impl Into<String>, frame: DataFrame) -> Result<()> {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(Error::DuplicateDataSource(name));
        }
        debug!(source = %name, "registered static data source");
        self.sources.insert(name, DataSource::Static(frame));
        Ok(())
    }

    /// Register a dynamic loader under `name`.
    pub fn register_loader(
        &mut self,
        name: impl Into<String>,
        loader: Arc<dyn DataLoader>,
    ) -> Result<()> {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(Error::DuplicateDataSource(name));
        }
        debug!(source = %name, "registered dynamic data source");
        self.sources.insert(
            name,
            DataSource::Dynamic {
                loader,
                timeout: CacheTimeout::Default,
            },
        );
        Ok(())
    }

    /// Install the shared cache used for all dynamic sources. Must be set
    /// before the first load for caching to take effect on that load.
    pub fn set_cache(&mut self, cache: Arc<dyn DataCache>) {
        self.cache = Some(cache);
    }

    /// Set the cache expiry policy for a dynamic source. Static sources do
    /// not support a timeout.
    pub fn set_timeout(&mut self, name: &str, timeout: CacheTimeout) -> Result<()> {
        match self.sources.get_mut(name) {
            None => Err(Error::DataSourceNotFound(name.to_string())),
            Some(DataSource::Static(_)) => Err(Error::StaticSourceTimeout),
            Some(DataSource::Dynamic { timeout: slot, .. }) => {
                *slot = timeout;
                Ok(())
            }
        }
    }

    /// Whether `name` is a dynamic (loader-backed) source.
    pub fn is_dynamic(&self, name: &str) -> Result<bool> {
        match self.sources.get(name) {
            None => Err(Error::DataSourceNotFound(name.to_string())),
            Some(DataSource::Static(_)) => Ok(false),
            Some(DataSource::Dynamic { .. }) => Ok(true),
        }
    }

    /// Load a source with no arguments.
    pub fn load(&self, name: &str) -> Result<DataFrame> {
        self.load_with(name, &LoadArguments::new())
    }

    /// Load a source, passing `args` to its loader when it is dynamic.
    /// Static sources reject non-empty arguments.
    pub fn load_with(&self, name: &str, args: &LoadArguments) -> Result<DataFrame> {
        match self.sources.get(name) {
            None => Err(Error::DataSourceNotFound(name.to_string())),
            Some(DataSource::Static(frame)) => {
                if !args.is_empty() {
                    return Err(Error::StaticLoadArguments(name.to_string()));
                }
                // Copy on load so a caller (e.g. a user action) mutating the
                // result cannot corrupt the registered frame.
                Ok(frame.clone())
            }
            Some(DataSource::Dynamic { loader, timeout }) => {
                let timeout = *timeout;
                if let (Some(cache), false) = (&self.cache, timeout == CacheTimeout::Never) {
                    let key = cache_key(name, args);
                    debug!(source = %name, "looking in cache for data source");
                    if let Some(frame) = cache.lookup(&key, timeout) {
                        return Ok(frame);
                    }
                    debug!(source = %name, "cache miss; reloading data");
                    let frame = loader.load(args).map_err(|source| Error::LoaderFailed {
                        name: name.to_string(),
                        source,
                    })?;
                    cache.store(&key, frame.clone());
                    Ok(frame)
                } else {
                    debug!(source = %name, "cache not active; reloading data");
                    loader.load(args).map_err(|source| Error::LoaderFailed {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        }
    }

    /// Load multiple `(source, arguments)` pairs, invoking each distinct
    /// pair's loader only once. Results come back in request order.
    pub fn multi_load(&self, requests: &[(DataSourceName, LoadArguments)]) -> Result<Vec<DataFrame>> {
        let mut loaded: BTreeMap<String, DataFrame> = BTreeMap::new();
        for (name, args) in requests {
            let key = cache_key(name, args);
            if !loaded.contains_key(&key) {
                loaded.insert(key, self.load_with(name, args)?);
            }
        }
        Ok(requests
            .iter()
            .map(|(name, args)| loaded[&cache_key(name, args)].clone())
            .collect())
    }

    /// Record that `component` reads its data frame from `name`.
    pub fn bind_component(&mut self, component: ModelId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !self.sources.contains_key(&name) {
            return Err(Error::DataSourceNotFound(name));
        }
        if let Some(existing) = self.bindings.get(&component) {
            return Err(Error::DuplicateBinding {
                component: component.to_string(),
                existing: existing.clone(),
            });
        }
        self.bindings.insert(component, name);
        Ok(())
    }

    /// The data source a component is bound to, if any.
    #[must_use]
    pub fn binding(&self, component: &ModelId) -> Option<&DataSourceName> {
        self.bindings.get(component)
    }

    /// Load the data frame for a bound component with no arguments.
    pub fn component_data(&self, component: &ModelId) -> Result<DataFrame> {
        self.component_data_with(component, &LoadArguments::new())
    }

    /// Load the data frame for a bound component, passing loader arguments.
    pub fn component_data_with(
        &self,
        component: &ModelId,
        args: &LoadArguments,
    ) -> Result<DataFrame> {
        let name = self
            .bindings
            .get(component)
            .ok_or_else(|| Error::ComponentNotBound(component.to_string()))?;
        self.load_with(name, args)
    }

    /// Invalidate every cached entry for `name` so the next access reloads.
    pub fn refresh(&self, name: &str) -> Result<()> {
        if !self.sources.contains_key(name) {
            return Err(Error::DataSourceNotFound(name.to_string()));
        }
        if let Some(cache) = &self.cache {
            cache.invalidate_source(name);
        }
        Ok(())
    }
}
