//! Collection scanning.
//!
//! Field inference looks at a single sample record per collection. Fields
//! missing from that sample are never searched; schema drift inside a
//! collection is a known limitation.

use std::sync::{Arc, RwLock};

use crate::store::DocumentStore;
use crate::types::Collection;
use sanad_core::{AppError, AppResult};

/// Enumerate collections and infer their searchable string fields.
///
/// Per-collection sampling failures are logged and leave that collection
/// with an empty field set. Only a failure to list collections is an error.
pub async fn scan(store: &dyn DocumentStore, id_field: &str) -> AppResult<Vec<Collection>> {
    let names = store.list_collections().await?;
    let mut collections = Vec::with_capacity(names.len());

    for name in names {
        let fields = match store.find_one(&name).await {
            Ok(Some(sample)) => sample
                .string_fields()
                .map(|(field, _)| field)
                .filter(|field| *field != id_field)
                .map(str::to_string)
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to sample collection '{}': {}", name, e);
                Vec::new()
            }
        };

        tracing::debug!("Collection '{}' has {} searchable fields", name, fields.len());
        collections.push(Collection::new(name, fields));
    }

    tracing::info!(
        "Scanned {} collections from {} store",
        collections.len(),
        store.name()
    );
    Ok(collections)
}

/// The current collection scan, replaced atomically on rescan.
#[derive(Debug)]
pub struct CollectionCatalog {
    current: RwLock<Arc<Vec<Collection>>>,
}

impl Default for CollectionCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CollectionCatalog {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self {
            current: RwLock::new(Arc::new(collections)),
        }
    }

    /// The scan in effect right now.
    pub fn snapshot(&self) -> Arc<Vec<Collection>> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Publish a new scan.
    pub fn replace(&self, collections: Vec<Collection>) -> AppResult<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| AppError::Other("Collection catalog lock poisoned".to_string()))?;
        *guard = Arc::new(collections);
        Ok(())
    }

    /// Scan the store again and publish the result.
    pub async fn rescan(&self, store: &dyn DocumentStore, id_field: &str) -> AppResult<usize> {
        let collections = scan(store, id_field).await?;
        let count = collections.len();
        self.replace(collections)?;
        Ok(count)
    }
}
