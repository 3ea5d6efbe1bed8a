use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, StorageKind};
use crate::kv::{FileStore, KeyValueStore, MemoryStore};
use crate::store::RecordStore;

pub fn init_store(config: &Config) -> Result<RecordStore> {
    let kv: Arc<dyn KeyValueStore> = match config.storage {
        StorageKind::File => Arc::new(
            FileStore::open(&config.data_dir)
                .with_context(|| format!("Failed to open data directory {}", config.data_dir))?,
        ),
        StorageKind::Memory => Arc::new(MemoryStore::new()),
    };
    info!(storage = %config.storage, data_dir = %config.data_dir, "Record store ready");

    let store = RecordStore::new(kv);
    // fail at startup rather than on the first request
    store
        .load_employees()
        .context("Stored employees cannot be read")?;
    store
        .load_clock_ins()
        .context("Stored clock-ins cannot be read")?;
    Ok(store)
}
