//! Persistence abstraction for cost records

use super::cost::{CostRecord, NewCost};
use super::error::CostResult;
use async_trait::async_trait;

#[async_trait]
pub trait CostStore: Send + Sync {
    /// Validates and persists a cost, returning it with its assigned id.
    async fn add_cost(&self, input: NewCost) -> CostResult<CostRecord>;

    /// Every stored record in ascending id order.
    async fn get_all(&self) -> CostResult<Vec<CostRecord>>;
}
