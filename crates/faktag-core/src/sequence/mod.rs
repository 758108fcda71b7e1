//! Per-buyer sequential numbering.
//!
//! Each buyer NIP owns a counter that restarts at 1 with the first
//! allocation of a new year. Allocation is a compare-and-swap loop against
//! the [`CounterStore`], so concurrent callers never share a number.

mod label;

pub use label::{LabelFormatter, LabelScheme, default_schemes, vendor_letter};

use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::config::SequenceConfig;
use crate::store::{CounterState, CounterStore};

/// Next counter state after `current` for an allocation in `year`.
///
/// `None` when the counter has no numbers left this year.
pub fn advance(current: Option<CounterState>, year: i32) -> Option<CounterState> {
    let last_number = match current {
        Some(state) if state.year == year => state.last_number.checked_add(1)?,
        _ => 1,
    };
    Some(CounterState { last_number, year })
}

/// Current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Allocates sequential numbers from a shared counter store.
pub struct SequenceAssigner {
    store: Arc<dyn CounterStore>,
    max_attempts: u32,
}

impl SequenceAssigner {
    pub fn new(store: Arc<dyn CounterStore>, config: &SequenceConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Allocate the next number for `buyer_nip` in the current year.
    pub async fn next_number(&self, buyer_nip: &str) -> Result<u32, StoreError> {
        self.next_number_in_year(buyer_nip, current_year()).await
    }

    /// Allocate the next number for `buyer_nip` in `year`.
    pub async fn next_number_in_year(&self, buyer_nip: &str, year: i32) -> Result<u32, StoreError> {
        for attempt in 1..=self.max_attempts {
            let current = self.store.get_counter(buyer_nip).await?;
            let next = advance(current, year).ok_or_else(|| StoreError::Exhausted {
                key: buyer_nip.to_string(),
                year,
            })?;

            if self.store.compare_and_swap(buyer_nip, current, next).await? {
                info!("Allocated number {} for buyer {} ({})", next.last_number, buyer_nip, year);
                return Ok(next.last_number);
            }

            debug!("Counter for {} changed concurrently, retry {}", buyer_nip, attempt);
        }

        Err(StoreError::Conflict {
            key: buyer_nip.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Set the last allocated number; the next allocation returns `last_number + 1`.
    pub async fn reset_counter(&self, buyer_nip: &str, last_number: u32) -> Result<(), StoreError> {
        info!("Resetting counter for {} to {}", buyer_nip, last_number);
        self.store
            .set_counter(buyer_nip, CounterState { last_number, year: current_year() })
            .await
    }

    pub async fn current(&self, buyer_nip: &str) -> Result<Option<CounterState>, StoreError> {
        self.store.get_counter(buyer_nip).await
    }
}
