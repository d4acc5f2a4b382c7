//! Named, reloadable signature catalogs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error_handling::CatalogLoadError;
use crate::fingerprint::models::SignatureCatalog;
use crate::fingerprint::ruleset::load_catalog;

/// Holds signature catalogs by name and swaps them on reload.
///
/// Readers get an `Arc` snapshot; a reload builds the new catalog without
/// holding the lock and only takes the write lock to publish it, so
/// detections already running keep using the catalog they started with.
#[derive(Debug, Default)]
pub struct CatalogStore {
    sources: HashMap<String, PathBuf>,
    catalogs: RwLock<HashMap<String, Arc<SignatureCatalog>>>,
}

impl CatalogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CatalogStore::register`].
    pub fn with_source(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.register(name, path);
        self
    }

    /// Registers (or re-points) the document backing `name`. Nothing is read yet.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.sources.insert(name.into(), path.into());
    }

    /// Publishes an already-built catalog under `name`.
    pub async fn insert(&self, name: impl Into<String>, catalog: SignatureCatalog) -> Arc<SignatureCatalog> {
        let catalog = Arc::new(catalog);
        self.catalogs
            .write()
            .await
            .insert(name.into(), catalog.clone());
        catalog
    }

    /// Current snapshot for `name`, if one has been loaded or inserted.
    pub async fn get(&self, name: &str) -> Option<Arc<SignatureCatalog>> {
        self.catalogs.read().await.get(name).cloned()
    }

    /// Returns the catalog for `name`, loading it from its source the first time.
    pub async fn load(&self, name: &str) -> Result<Arc<SignatureCatalog>, CatalogLoadError> {
        if let Some(existing) = self.get(name).await {
            return Ok(existing);
        }
        self.reload(name).await
    }

    /// Re-reads the source for `name` and publishes the result.
    ///
    /// On failure the previously published catalog stays in place.
    pub async fn reload(&self, name: &str) -> Result<Arc<SignatureCatalog>, CatalogLoadError> {
        let path = self.source_path(name)?;
        let catalog = Arc::new(load_catalog(path).await?);

        self.catalogs
            .write()
            .await
            .insert(name.to_string(), catalog.clone());
        log::info!("Published signature catalog '{}' from {}", name, path.display());
        Ok(catalog)
    }

    /// Reloads every registered source, returning the ones that failed.
    pub async fn reload_all(&self) -> Vec<(String, CatalogLoadError)> {
        let mut failures = Vec::new();
        for name in self.names() {
            if let Err(e) = self.reload(&name).await {
                log::warn!("Keeping previous catalog '{}': {}", name, e);
                failures.push((name, e));
            }
        }
        failures
    }

    /// Registered source names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    fn source_path(&self, name: &str) -> Result<&Path, CatalogLoadError> {
        self.sources
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| CatalogLoadError::UnknownCatalog(name.to_string()))
    }
}
