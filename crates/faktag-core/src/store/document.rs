use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BuyerMapping, CounterState, VendorMapping};

/// Everything a store holds, in the shape it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreDocument {
    /// Vendor mappings keyed by [`super::vendor_key`].
    pub vendors: BTreeMap<String, VendorMapping>,

    /// Confirmed vendor names keyed by vendor NIP.
    pub vendor_nip_names: BTreeMap<String, String>,

    /// Buyer mappings keyed by [`super::buyer_key`].
    pub buyer_mappings: BTreeMap<String, BuyerMapping>,

    /// Per-buyer counters keyed by buyer NIP.
    pub counters: BTreeMap<String, CounterState>,
}
