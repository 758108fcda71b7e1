//! Persistence boundary: vendor mappings, buyer mappings and buyer counters.
//!
//! The pipeline only talks to the async traits defined here. Two reference
//! backends are provided: [`MemoryStore`] for tests and embedding, and
//! [`JsonFileStore`], which keeps everything in one JSON file.

mod document;
mod json;
mod memory;

pub use document::StoreDocument;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::normalize::fold_text;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Classification codes remembered for a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMapping {
    /// Vendor name as it was saved.
    pub name: String,
    pub mpk: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub last_used: i64,
}

/// A buyer confirmed by the user, used to correct misread buyer NIPs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerMapping {
    pub nip: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub created_at: i64,
    pub last_used: i64,
}

/// Last allocated number of a buyer and the year it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub last_number: u32,
    pub year: i32,
}

/// Key of a vendor mapping: lowercase ASCII letters and digits only.
pub fn vendor_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Key of a buyer mapping: folded name with spaces replaced by underscores.
pub fn buyer_key(name: &str) -> String {
    fold_text(name).replace(' ', "_")
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Mapping stored under exactly `key`.
    async fn get_vendor(&self, key: &str) -> Result<Option<VendorMapping>>;

    /// All mappings with their keys.
    async fn list_vendors(&self) -> Result<Vec<(String, VendorMapping)>>;

    /// Insert or replace a mapping (last write wins).
    async fn put_vendor(&self, key: &str, mapping: VendorMapping) -> Result<()>;

    /// Update `last_used` of an existing mapping. Missing keys are ignored.
    async fn touch_vendor(&self, key: &str, at: i64) -> Result<()>;

    /// Confirmed display name for a vendor NIP.
    async fn get_vendor_name(&self, nip: &str) -> Result<Option<String>>;

    /// Remember the display name for a vendor NIP.
    async fn put_vendor_name(&self, nip: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait BuyerStore: Send + Sync {
    async fn list_buyers(&self) -> Result<Vec<BuyerMapping>>;

    async fn put_buyer(&self, key: &str, mapping: BuyerMapping) -> Result<()>;
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn get_counter(&self, nip: &str) -> Result<Option<CounterState>>;

    /// Store `new` only if the current state equals `expected`.
    ///
    /// Returns `false` when another writer got there first.
    async fn compare_and_swap(
        &self,
        nip: &str,
        expected: Option<CounterState>,
        new: CounterState,
    ) -> Result<bool>;

    /// Overwrite the counter unconditionally.
    async fn set_counter(&self, nip: &str, state: CounterState) -> Result<()>;
}

/// Backends that hold the whole store as one [`StoreDocument`].
///
/// Any such backend gets the three store traits for free.
pub trait DocumentBackend: Send + Sync {
    fn read<R>(&self, f: impl FnOnce(&StoreDocument) -> R) -> Result<R>;

    fn write<R>(&self, f: impl FnOnce(&mut StoreDocument) -> R) -> Result<R>;
}

#[async_trait]
impl<B: DocumentBackend> VendorStore for B {
    async fn get_vendor(&self, key: &str) -> Result<Option<VendorMapping>> {
        self.read(|doc| doc.vendors.get(key).cloned())
    }

    async fn list_vendors(&self) -> Result<Vec<(String, VendorMapping)>> {
        self.read(|doc| {
            doc.vendors
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    }

    async fn put_vendor(&self, key: &str, mapping: VendorMapping) -> Result<()> {
        self.write(|doc| {
            doc.vendors.insert(key.to_string(), mapping);
        })
    }

    async fn touch_vendor(&self, key: &str, at: i64) -> Result<()> {
        self.write(|doc| {
            if let Some(mapping) = doc.vendors.get_mut(key) {
                mapping.last_used = at;
            }
        })
    }

    async fn get_vendor_name(&self, nip: &str) -> Result<Option<String>> {
        self.read(|doc| doc.vendor_nip_names.get(nip).cloned())
    }

    async fn put_vendor_name(&self, nip: &str, name: &str) -> Result<()> {
        self.write(|doc| {
            doc.vendor_nip_names.insert(nip.to_string(), name.to_string());
        })
    }
}

#[async_trait]
impl<B: DocumentBackend> BuyerStore for B {
    async fn list_buyers(&self) -> Result<Vec<BuyerMapping>> {
        self.read(|doc| doc.buyer_mappings.values().cloned().collect())
    }

    async fn put_buyer(&self, key: &str, mapping: BuyerMapping) -> Result<()> {
        self.write(|doc| {
            doc.buyer_mappings.insert(key.to_string(), mapping);
        })
    }
}

#[async_trait]
impl<B: DocumentBackend> CounterStore for B {
    async fn get_counter(&self, nip: &str) -> Result<Option<CounterState>> {
        self.read(|doc| doc.counters.get(nip).copied())
    }

    async fn compare_and_swap(
        &self,
        nip: &str,
        expected: Option<CounterState>,
        new: CounterState,
    ) -> Result<bool> {
        self.write(|doc| {
            if doc.counters.get(nip).copied() != expected {
                return false;
            }
            doc.counters.insert(nip.to_string(), new);
            true
        })
    }

    async fn set_counter(&self, nip: &str, state: CounterState) -> Result<()> {
        self.write(|doc| {
            doc.counters.insert(nip.to_string(), state);
        })
    }
}
