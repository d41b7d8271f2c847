pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreKind};
use crate::core::error::{CostError, CostResult};
use crate::core::store::CostStore;
use disk::FjallCostStore;
use memory::MemoryCostStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the store engine selected by `config`.
pub fn open(config: &AppConfig) -> CostResult<Arc<dyn CostStore>> {
    match config.store {
        StoreKind::Memory => {
            debug!("Using in-memory cost store");
            Ok(Arc::new(MemoryCostStore::new()))
        }
        StoreKind::Disk => {
            let path = config
                .store_path()
                .map_err(|e| CostError::StorageUnavailable(e.to_string()))?;
            Ok(Arc::new(FjallCostStore::open(&path)?))
        }
    }
}
