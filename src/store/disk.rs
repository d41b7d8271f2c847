use crate::core::cost::{CostRecord, NewCost};
use crate::core::error::{CostError, CostResult};
use crate::core::store::CostStore;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const COSTS_PARTITION: &str = "costs";
const META_PARTITION: &str = "meta";
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Cost store backed by a fjall keyspace.
///
/// Records live in the `costs` partition keyed by big-endian id, so
/// iteration order is id order.
pub struct FjallCostStore {
    keyspace: Keyspace,
    costs: PartitionHandle,
    last_id: Mutex<u64>,
}

impl FjallCostStore {
    pub fn open(path: &Path) -> CostResult<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            CostError::StorageUnavailable(format!(
                "Failed to create data directory {}: {e}",
                path.display()
            ))
        })?;

        let keyspace = Config::new(path)
            .open()
            .map_err(|e| CostError::StorageUnavailable(format!("Failed to open keyspace: {e}")))?;
        let meta = keyspace
            .open_partition(META_PARTITION, PartitionCreateOptions::default())
            .map_err(|e| CostError::StorageUnavailable(format!("Failed to open metadata: {e}")))?;

        Self::upgrade(&keyspace, &meta)?;

        let costs = keyspace
            .open_partition(COSTS_PARTITION, PartitionCreateOptions::default())
            .map_err(|e| CostError::StorageUnavailable(format!("Failed to open costs: {e}")))?;

        let last_id = match costs
            .last_key_value()
            .map_err(|e| CostError::StorageUnavailable(e.to_string()))?
        {
            Some((key, _)) => {
                decode_id(&key).map_err(|e| CostError::StorageUnavailable(e.to_string()))?
            }
            None => 0,
        };
        debug!(path = %path.display(), last_id, "Opened cost store");

        Ok(Self {
            keyspace,
            costs,
            last_id: Mutex::new(last_id),
        })
    }

    /// Brings the on-disk schema up to [`SCHEMA_VERSION`].
    fn upgrade(keyspace: &Keyspace, meta: &PartitionHandle) -> CostResult<()> {
        let stored = read_schema_version(meta)?;
        match stored {
            Some(version) if version == SCHEMA_VERSION => return Ok(()),
            Some(version) if version > SCHEMA_VERSION => {
                return Err(CostError::StorageUnavailable(format!(
                    "Store schema version {version} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
            Some(version) => info!(
                from = version,
                to = SCHEMA_VERSION,
                "Upgrading cost store schema"
            ),
            None => info!(version = SCHEMA_VERSION, "Initializing cost store schema"),
        }

        // Version 1 only requires the costs partition, which open() creates.
        meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_be_bytes().as_slice())
            .map_err(|e| CostError::StorageUnavailable(e.to_string()))?;
        keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| CostError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    pub fn schema_version(&self) -> CostResult<Option<u32>> {
        let meta = self
            .keyspace
            .open_partition(META_PARTITION, PartitionCreateOptions::default())?;
        read_schema_version(&meta)
    }

    pub(crate) async fn add_cost_on(
        &self,
        input: NewCost,
        today: NaiveDate,
    ) -> CostResult<CostRecord> {
        input.validate()?;

        self.write_record(input, today, |keyspace| {
            Ok(keyspace.persist(PersistMode::SyncAll)?)
        })
        .await
    }

    /// Inserts the record under the next id and flushes it with `persist`.
    ///
    /// The id is consumed as soon as the insert succeeds. If the flush fails
    /// the record is removed again, so a failed add is never readable.
    async fn write_record<F>(
        &self,
        input: NewCost,
        today: NaiveDate,
        persist: F,
    ) -> CostResult<CostRecord>
    where
        F: FnOnce(&Keyspace) -> CostResult<()>,
    {
        let mut last_id = self.last_id.lock().await;
        let id = *last_id + 1;
        let record = input.into_record(id, today);
        let key = id.to_be_bytes();

        self.costs
            .insert(key.as_slice(), serde_json::to_vec(&record)?)?;
        *last_id = id;

        if let Err(e) = persist(&self.keyspace) {
            warn!(id, error = %e, "Failed to flush cost, discarding it");
            if let Err(remove_err) = self.costs.remove(key.as_slice()) {
                warn!(id, error = %remove_err, "Failed to discard unflushed cost");
            }
            return Err(e);
        }

        debug!(id, "Cost store PUT");
        Ok(record)
    }
}

fn read_schema_version(meta: &PartitionHandle) -> CostResult<Option<u32>> {
    let Some(value) = meta.get(SCHEMA_VERSION_KEY)? else {
        return Ok(None);
    };
    let bytes = <[u8; 4]>::try_from(&*value).map_err(|_| {
        CostError::StorageUnavailable("Corrupt schema version entry".to_string())
    })?;
    Ok(Some(u32::from_be_bytes(bytes)))
}

fn decode_id(key: &[u8]) -> CostResult<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| CostError::Storage(format!("Invalid cost key of {} bytes", key.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl CostStore for FjallCostStore {
    async fn add_cost(&self, input: NewCost) -> CostResult<CostRecord> {
        self.add_cost_on(input, Local::now().date_naive()).await
    }

    async fn get_all(&self) -> CostResult<Vec<CostRecord>> {
        let mut records = Vec::new();
        for item in self.costs.iter() {
            let (key, value) = item?;
            let record: CostRecord = serde_json::from_slice(&value)?;
            if record.id != decode_id(&key)? {
                return Err(CostError::Storage(format!(
                    "Record id {} does not match its key",
                    record.id
                )));
            }
            records.push(record);
        }
        debug!(count = records.len(), "Cost store GET ALL");
        Ok(records)
    }
}
