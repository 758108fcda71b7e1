use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use tracing::{debug, info, trace};

use super::{DocumentBackend, Result, StoreDocument};
use crate::error::StoreError;

/// Store backed by a single JSON file.
///
/// Every read loads the file again and every write runs under an exclusive
/// lock on a `.lock` file next to it: the document is re-read, changed and
/// persisted before the lock is released. Several handles, in one process or
/// many, can share a path without losing updates.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    /// Last state seen on disk. Also serializes writers of this handle.
    doc: Mutex<StoreDocument>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!("Store file {} does not exist yet", path.display());
        }
        let doc = load(&path)?;

        info!(
            "Opened store {} ({} vendors, {} buyers, {} counters)",
            path.display(),
            doc.vendors.len(),
            doc.buyer_mappings.len(),
            doc.counters.len()
        );

        Ok(Self {
            lock_path: path.with_extension("json.lock"),
            path,
            doc: Mutex::new(doc),
        })
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        Ok(())
    }

    /// Take the exclusive cross-process lock. Released when the file drops.
    fn lock_exclusive(&self) -> Result<File> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.lock_path.display(), e)))?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.lock_path.display(), e)))?;
        trace!("Locked {}", self.lock_path.display());
        Ok(file)
    }

    fn persist(&self, doc: &StoreDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)?;

        // Write next to the target and rename so readers never see a torn file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))
    }
}

/// Read the document at `path`. Missing or blank files are empty stores.
fn load(path: &Path) -> Result<StoreDocument> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreDocument::default()),
        Err(e) => return Err(StoreError::Unavailable(format!("{}: {}", path.display(), e))),
    };

    if content.trim().is_empty() {
        Ok(StoreDocument::default())
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

impl DocumentBackend for JsonFileStore {
    fn read<R>(&self, f: impl FnOnce(&StoreDocument) -> R) -> Result<R> {
        let mut guard = self
            .doc
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        *guard = load(&self.path)?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreDocument) -> R) -> Result<R> {
        let mut guard = self
            .doc
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        let lock = self.lock_exclusive()?;

        // Other handles may have written since our last look.
        let current = load(&self.path)?;
        let mut next = current.clone();
        let out = f(&mut next);
        if next != current {
            self.persist(&next)?;
        }
        *guard = next;

        FileExt::unlock(&lock)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.lock_path.display(), e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::models::config::SequenceConfig;
    use crate::sequence::SequenceAssigner;
    use crate::store::{BuyerStore, CounterState, CounterStore, VendorMapping, VendorStore};

    fn mapping(name: &str) -> VendorMapping {
        VendorMapping {
            name: name.to_string(),
            mpk: "MPK710".to_string(),
            group: "7/2".to_string(),
            category: None,
            created_at: 1,
            last_used: 1,
        }
    }

    #[tokio::test]
    async fn test_reopen_sees_committed_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put_vendor("orlen", mapping("Orlen")).await.unwrap();
            store.put_vendor_name("5260300517", "ORLEN S.A.").await.unwrap();
            store
                .set_counter("8522482321", CounterState { last_number: 7, year: 2025 })
                .await
                .unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_vendor("orlen").await.unwrap(), Some(mapping("Orlen")));
        assert_eq!(
            store.get_vendor_name("5260300517").await.unwrap().as_deref(),
            Some("ORLEN S.A.")
        );
        assert_eq!(
            store.get_counter("8522482321").await.unwrap(),
            Some(CounterState { last_number: 7, year: 2025 })
        );
        assert!(store.list_buyers().await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested/store.json")).unwrap();
        assert_eq!(store.read(|doc| doc.clone()).unwrap(), StoreDocument::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_two_handles_never_share_a_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let first = Arc::new(JsonFileStore::open(&path).unwrap());
        let second = Arc::new(JsonFileStore::open(&path).unwrap());
        let a = SequenceAssigner::new(first, &SequenceConfig::default());
        let b = SequenceAssigner::new(second, &SequenceConfig::default());

        assert_eq!(a.next_number_in_year("1234567890", 2025).await.unwrap(), 1);
        assert_eq!(b.next_number_in_year("1234567890", 2025).await.unwrap(), 2);
        assert_eq!(a.next_number_in_year("1234567890", 2025).await.unwrap(), 3);
        assert_eq!(b.current("1234567890").await.unwrap().map(|s| s.last_number), Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_handles_allocate_unique_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let config = SequenceConfig { max_attempts: 10_000 };

        let handles: Vec<_> = (0..20)
            .map(|_| {
                // a fresh handle per task, as separate processes would have
                let store = Arc::new(JsonFileStore::open(&path).unwrap());
                let seq = SequenceAssigner::new(store, &config);
                tokio::spawn(async move { seq.next_number_in_year("1234567890", 2025).await })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let n = handle.await.unwrap().unwrap();
            assert!(seen.insert(n), "number {} allocated twice", n);
        }
        assert_eq!(seen, (1..=20).collect::<HashSet<u32>>());
    }

    #[tokio::test]
    async fn test_reads_see_other_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let reader = JsonFileStore::open(&path).unwrap();
        let writer = JsonFileStore::open(&path).unwrap();

        writer.put_vendor("orlen", mapping("Orlen")).await.unwrap();
        assert_eq!(reader.get_vendor("orlen").await.unwrap(), Some(mapping("Orlen")));
    }

    #[test]
    fn test_document_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        store
            .write(|doc| {
                doc.vendor_nip_names
                    .insert("1".to_string(), "A".to_string());
            })
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("vendorNipNames"));
        assert!(raw.contains("buyerMappings"));
    }
}
