use std::sync::RwLock;

use super::{DocumentBackend, Result, StoreDocument};
use crate::error::StoreError;

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentBackend for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&StoreDocument) -> R) -> Result<R> {
        let guard = self
            .doc
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreDocument) -> R) -> Result<R> {
        let mut guard = self
            .doc
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}
