//! Subcommands and the settings they share.

pub mod batch;
pub mod buyers;
pub mod categories;
pub mod classify;
pub mod config;
pub mod counter;
pub mod process;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use faktag_core::models::config::FaktagConfig;
use faktag_core::ocr::PureOcrEngine;
use faktag_core::{InvoicePipeline, JsonFileStore};

/// Global options resolved once in `main`.
pub struct Settings {
    config_path: Option<String>,
    store_path: Option<PathBuf>,
}

impl Settings {
    pub fn new(config_path: Option<String>, store_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            store_path,
        }
    }

    /// The `--config` file, else the user config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(config::default_config_path)
    }

    /// An explicit config file must exist; the user config file is optional.
    pub fn load_config(&self) -> anyhow::Result<FaktagConfig> {
        let path = self.config_file();
        if self.config_path.is_some() || path.exists() {
            debug!("Loading config from {}", path.display());
            Ok(FaktagConfig::from_file(&path)?)
        } else {
            Ok(FaktagConfig::default())
        }
    }

    pub fn open_store(&self, config: &FaktagConfig) -> anyhow::Result<Arc<JsonFileStore>> {
        let path = self.store_path.clone().unwrap_or_else(|| config.store.path.clone());
        Ok(Arc::new(JsonFileStore::open(path)?))
    }

    /// Pipeline over the JSON store, optionally with OCR for scanned input.
    pub fn pipeline(
        &self,
        config: &FaktagConfig,
        with_ocr: bool,
    ) -> anyhow::Result<InvoicePipeline> {
        let store = self.open_store(config)?;
        let pipeline = InvoicePipeline::with_store(config, store);

        if !with_ocr {
            return Ok(pipeline);
        }

        match PureOcrEngine::from_dir(&config.ocr.model_dir) {
            Ok(engine) => Ok(pipeline.with_ocr(Arc::new(engine))),
            Err(e) => {
                warn!(
                    "OCR unavailable ({}), scanned documents will fail: {}",
                    config.ocr.model_dir.display(),
                    e
                );
                Ok(pipeline)
            }
        }
    }
}
