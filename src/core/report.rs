//! Month and year aggregation of cost records in a display currency.
use super::cost::{Category, CostRecord, Currency};
use super::error::{CostError, CostResult};
use super::rates::{RateTable, round2};
use super::store::CostStore;
use chrono::Datelike;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A stored cost together with its value in the report currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub cost: CostRecord,
    pub converted_sum: f64,
}

/// Costs of one calendar month, normalized to a single currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub year: i32,
    pub month: u32,
    pub currency: Currency,
    pub costs: Vec<ReportEntry>,
    pub total_sum: f64,
}

/// Per-month totals for a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyReport {
    pub year: i32,
    pub currency: Currency,
    pub monthly_totals: [f64; 12],
    pub annual_total: f64,
}

impl Report {
    /// Sum of `converted_sum` per category, for categories present in the report.
    pub fn category_totals(&self) -> BTreeMap<Category, f64> {
        let mut totals = BTreeMap::new();
        for entry in &self.costs {
            *totals.entry(entry.cost.category).or_insert(0.0) += entry.converted_sum;
        }
        totals.values_mut().for_each(|v| *v = round2(*v));
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

fn validate_month(month: u32) -> CostResult<()> {
    if !(1..=12).contains(&month) {
        return Err(CostError::Validation(format!(
            "Month must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}

/// Builds a report from already-loaded records. This is a pure calculation.
pub fn build_report(
    records: Vec<CostRecord>,
    year: i32,
    month: u32,
    target: Currency,
    rates: &RateTable,
) -> CostResult<Report> {
    validate_month(month)?;

    let costs: Vec<ReportEntry> = records
        .into_iter()
        .filter(|cost| cost.date.year() == year && cost.date.month() == month)
        .map(|cost| {
            let converted_sum = round2(rates.convert(cost.sum, cost.currency, target));
            ReportEntry {
                cost,
                converted_sum,
            }
        })
        .collect();

    // Summation order is fixed by id so totals do not depend on store order.
    let mut by_id: Vec<(u64, f64)> = costs
        .iter()
        .map(|entry| (entry.cost.id, entry.converted_sum))
        .collect();
    by_id.sort_by_key(|(id, _)| *id);
    let total_sum = round2(by_id.iter().map(|(_, sum)| sum).sum());

    debug!(
        year,
        month,
        %target,
        count = costs.len(),
        total_sum,
        "Built report"
    );

    Ok(Report {
        year,
        month,
        currency: target,
        costs,
        total_sum,
    })
}

/// Loads the costs of `year`/`month` from the store and converts them to `target`.
pub async fn get_report(
    store: &dyn CostStore,
    year: i32,
    month: u32,
    target: Currency,
    rates: &RateTable,
) -> CostResult<Report> {
    validate_month(month)?;
    let records = store.get_all().await?;
    build_report(records, year, month, target, rates)
}

/// Runs the twelve month reports of `year` concurrently.
pub async fn get_yearly_report(
    store: &dyn CostStore,
    year: i32,
    target: Currency,
    rates: &RateTable,
) -> CostResult<YearlyReport> {
    let reports = join_all((1..=12).map(|month| get_report(store, year, month, target, rates))).await;

    let mut monthly_totals = [0.0; 12];
    for (slot, report) in monthly_totals.iter_mut().zip(reports) {
        *slot = report?.total_sum;
    }
    let annual_total = round2(monthly_totals.iter().sum());

    Ok(YearlyReport {
        year,
        currency: target,
        monthly_totals,
        annual_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::NewCost;
    use crate::core::rates::RateSource;
    use crate::store::memory::MemoryCostStore;
    use chrono::NaiveDate;

    fn new_cost(
        sum: f64,
        currency: Currency,
        category: Category,
        date: (i32, u32, u32),
    ) -> NewCost {
        NewCost {
            sum,
            currency,
            category,
            description: format!("{category} expense"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        }
    }

    async fn seeded_store(costs: Vec<NewCost>) -> MemoryCostStore {
        let store = MemoryCostStore::new();
        for cost in costs {
            store.add_cost(cost).await.unwrap();
        }
        store
    }

    fn usd_ils_rates() -> RateTable {
        RateTable::new([("USD", 1.0), ("ILS", 3.4)], RateSource::Live)
    }

    #[tokio::test]
    async fn test_mixed_currency_report() {
        let store = seeded_store(vec![
            new_cost(100.0, Currency::Usd, Category::Food, (2024, 3, 5)),
            new_cost(50.0, Currency::Ils, Category::Other, (2024, 3, 10)),
        ])
        .await;

        let report = get_report(&store, 2024, 3, Currency::Usd, &usd_ils_rates())
            .await
            .unwrap();

        assert_eq!(report.costs.len(), 2);
        assert_eq!(report.costs[0].converted_sum, 100.0);
        assert_eq!(report.costs[1].converted_sum, 14.71);
        assert_eq!(report.total_sum, 114.71);
        assert_eq!(report.costs[1].cost.sum, 50.0);
        assert_eq!(report.costs[1].cost.currency, Currency::Ils);
    }

    #[tokio::test]
    async fn test_report_in_non_usd_currency() {
        let store = seeded_store(vec![new_cost(
            10.0,
            Currency::Usd,
            Category::Food,
            (2024, 3, 5),
        )])
        .await;

        let report = get_report(&store, 2024, 3, Currency::Ils, &usd_ils_rates())
            .await
            .unwrap();
        assert_eq!(report.total_sum, 34.0);
        assert_eq!(report.currency, Currency::Ils);
    }

    #[tokio::test]
    async fn test_month_boundaries() {
        let store = seeded_store(vec![
            new_cost(1.0, Currency::Usd, Category::Food, (2024, 2, 29)),
            new_cost(2.0, Currency::Usd, Category::Food, (2024, 3, 1)),
            new_cost(4.0, Currency::Usd, Category::Food, (2024, 3, 31)),
            new_cost(8.0, Currency::Usd, Category::Food, (2024, 4, 1)),
            new_cost(16.0, Currency::Usd, Category::Food, (2023, 3, 15)),
        ])
        .await;
        let rates = RateTable::fallback();

        let march = get_report(&store, 2024, 3, Currency::Usd, &rates)
            .await
            .unwrap();
        assert_eq!(march.total_sum, 6.0);
        assert!(
            march
                .costs
                .iter()
                .any(|e| e.cost.date == NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
        );

        let april = get_report(&store, 2024, 4, Currency::Usd, &rates)
            .await
            .unwrap();
        assert_eq!(april.total_sum, 8.0);
        assert!(
            april
                .costs
                .iter()
                .all(|e| e.cost.date != NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
        );

        let december_boundary = seeded_store(vec![new_cost(
            3.0,
            Currency::Usd,
            Category::Food,
            (2024, 12, 31),
        )])
        .await;
        let jan_next = get_report(&december_boundary, 2025, 1, Currency::Usd, &rates)
            .await
            .unwrap();
        assert!(jan_next.is_empty());
        assert_eq!(jan_next.total_sum, 0.0);
    }

    #[tokio::test]
    async fn test_report_is_idempotent() {
        let store = seeded_store(vec![
            new_cost(19.99, Currency::Gbp, Category::Sport, (2024, 5, 2)),
            new_cost(7.35, Currency::Euro, Category::Health, (2024, 5, 3)),
            new_cost(120.0, Currency::Ils, Category::Education, (2024, 5, 4)),
        ])
        .await;
        let rates = RateTable::fallback();

        let first = get_report(&store, 2024, 5, Currency::Euro, &rates)
            .await
            .unwrap();
        let second = get_report(&store, 2024, 5, Currency::Euro, &rates)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_sum.to_bits(), second.total_sum.to_bits());
    }

    #[test]
    fn test_total_does_not_depend_on_input_order() {
        let records: Vec<CostRecord> = [0.1, 0.2, 0.3, 1e-3, 5.55]
            .into_iter()
            .enumerate()
            .map(|(i, sum)| CostRecord {
                id: i as u64 + 1,
                sum,
                currency: Currency::Usd,
                category: Category::Other,
                description: "x".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .collect();
        let mut reversed = records.clone();
        reversed.reverse();
        let rates = RateTable::fallback();

        let forward = build_report(records, 2024, 1, Currency::Usd, &rates).unwrap();
        let backward = build_report(reversed, 2024, 1, Currency::Usd, &rates).unwrap();

        assert_eq!(forward.total_sum.to_bits(), backward.total_sum.to_bits());
        assert_eq!(backward.costs[0].cost.id, 5);
    }

    #[tokio::test]
    async fn test_missing_rates_are_identity() {
        let store = seeded_store(vec![new_cost(
            42.0,
            Currency::Gbp,
            Category::Food,
            (2024, 7, 7),
        )])
        .await;
        let rates = RateTable::new([("USD", 1.0)], RateSource::Live);

        let report = get_report(&store, 2024, 7, Currency::Euro, &rates)
            .await
            .unwrap();
        assert_eq!(report.total_sum, 42.0);
    }

    #[tokio::test]
    async fn test_invalid_month() {
        let store = MemoryCostStore::new();
        let rates = RateTable::fallback();

        for month in [0, 13] {
            let err = get_report(&store, 2024, month, Currency::Usd, &rates)
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[tokio::test]
    async fn test_category_totals() {
        let store = seeded_store(vec![
            new_cost(10.0, Currency::Usd, Category::Food, (2024, 3, 1)),
            new_cost(5.5, Currency::Usd, Category::Food, (2024, 3, 2)),
            new_cost(34.0, Currency::Ils, Category::Housing, (2024, 3, 3)),
        ])
        .await;

        let report = get_report(&store, 2024, 3, Currency::Usd, &usd_ils_rates())
            .await
            .unwrap();
        let totals = report.category_totals();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&Category::Food], 15.5);
        assert_eq!(totals[&Category::Housing], 10.0);
        assert!(!totals.contains_key(&Category::Sport));
    }

    #[tokio::test]
    async fn test_yearly_report() {
        let store = seeded_store(vec![
            new_cost(10.0, Currency::Usd, Category::Food, (2024, 1, 15)),
            new_cost(20.0, Currency::Usd, Category::Food, (2024, 1, 20)),
            new_cost(34.0, Currency::Ils, Category::Food, (2024, 6, 1)),
            new_cost(99.0, Currency::Usd, Category::Food, (2023, 6, 1)),
        ])
        .await;

        let yearly = get_yearly_report(&store, 2024, Currency::Usd, &usd_ils_rates())
            .await
            .unwrap();

        assert_eq!(yearly.monthly_totals[0], 30.0);
        assert_eq!(yearly.monthly_totals[5], 10.0);
        assert_eq!(yearly.monthly_totals.iter().filter(|t| **t != 0.0).count(), 2);
        assert_eq!(yearly.annual_total, 40.0);
    }

    #[test]
    fn test_report_serializes_flat_entries() {
        let report = build_report(
            vec![CostRecord {
                id: 1,
                sum: 50.0,
                currency: Currency::Ils,
                category: Category::Other,
                description: "Bus".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            }],
            2024,
            3,
            Currency::Usd,
            &RateTable::new([("USD", 1.0), ("ILS", 3.4)], RateSource::Live),
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["costs"][0]["id"], 1);
        assert_eq!(json["costs"][0]["converted_sum"], 14.71);
        assert_eq!(json["total_sum"], 14.71);
    }
}
