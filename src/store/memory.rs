use crate::core::cost::{CostRecord, NewCost};
use crate::core::error::CostResult;
use crate::core::store::CostStore;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct Inner {
    records: Vec<CostRecord>,
    last_id: u64,
}

/// In-memory cost store; contents are lost when dropped
#[derive(Clone, Default)]
pub struct MemoryCostStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn add_cost_on(&self, input: NewCost, today: NaiveDate) -> CostResult<CostRecord> {
        input.validate()?;

        let mut inner = self.inner.lock().await;
        let id = inner.last_id + 1;
        let record = input.into_record(id, today);
        inner.records.push(record.clone());
        inner.last_id = id;
        debug!(id, "Memory store PUT");
        Ok(record)
    }
}

#[async_trait]
impl CostStore for MemoryCostStore {
    async fn add_cost(&self, input: NewCost) -> CostResult<CostRecord> {
        self.add_cost_on(input, Local::now().date_naive()).await
    }

    async fn get_all(&self) -> CostResult<Vec<CostRecord>> {
        let inner = self.inner.lock().await;
        debug!(count = inner.records.len(), "Memory store GET ALL");
        Ok(inner.records.clone())
    }
}
