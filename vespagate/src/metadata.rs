//! In-memory index metadata registry
//!
//! Index settings and mappings live only for the lifetime of the
//! process; restarting the gateway forgets every index that was
//! created through it. Documents in the backend are unaffected.

use crate::error::GatewayError;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Metadata tracked per index
#[derive(Debug, Clone, Default)]
pub struct IndexMetadata {
    pub uuid: String,
    pub settings: Map<String, Value>,
    pub mappings: Map<String, Value>,
}

/// Concurrent name -> metadata registry
#[derive(Default)]
pub struct IndexMetadataStore {
    indices: RwLock<HashMap<String, IndexMetadata>>,
}

impl IndexMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index. Re-creating an existing name replaces its
    /// metadata and assigns a fresh UUID.
    pub fn create(&self, name: &str, settings: Map<String, Value>) -> IndexMetadata {
        let metadata = IndexMetadata {
            uuid: Uuid::new_v4().to_string(),
            settings,
            mappings: Map::new(),
        };
        self.indices
            .write()
            .insert(name.to_string(), metadata.clone());
        metadata
    }

    pub fn exists(&self, name: &str) -> bool {
        self.indices.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<IndexMetadata, GatewayError> {
        self.indices
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::IndexNotFound(name.to_string()))
    }

    pub fn delete(&self, name: &str) -> Result<(), GatewayError> {
        self.indices
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| GatewayError::IndexNotFound(name.to_string()))
    }

    /// Replace the mappings of an existing index
    pub fn update_mapping(
        &self,
        name: &str,
        mappings: Map<String, Value>,
    ) -> Result<(), GatewayError> {
        let mut indices = self.indices.write();
        let entry = indices
            .get_mut(name)
            .ok_or_else(|| GatewayError::IndexNotFound(name.to_string()))?;
        entry.mappings = mappings;
        Ok(())
    }

    /// Merge new settings keys over the existing ones. The merge holds
    /// the write lock across the whole read-modify-write.
    pub fn update_settings(
        &self,
        name: &str,
        settings: Map<String, Value>,
    ) -> Result<(), GatewayError> {
        let mut indices = self.indices.write();
        let entry = indices
            .get_mut(name)
            .ok_or_else(|| GatewayError::IndexNotFound(name.to_string()))?;
        for (key, value) in settings {
            entry.settings.insert(key, value);
        }
        Ok(())
    }

    /// Snapshot of all indices, sorted by name
    pub fn list_all(&self) -> Vec<(String, IndexMetadata)> {
        let mut entries: Vec<_> = self
            .indices
            .read()
            .iter()
            .map(|(name, meta)| (name.clone(), meta.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
