use super::report::fetch_rates_with_progress;
use super::ui;
use crate::core::cost::{Category, Currency};
use crate::core::rates::RateProvider;
use crate::core::report::{Report, get_report};
use crate::core::store::CostStore;
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::collections::BTreeMap;

/// Category share of a report total, in percent.
pub fn category_shares(report: &Report) -> BTreeMap<Category, (f64, f64)> {
    report
        .category_totals()
        .into_iter()
        .map(|(category, total)| {
            let share = if report.total_sum > 0.0 {
                total * 100.0 / report.total_sum
            } else {
                0.0
            };
            (category, (total, share))
        })
        .collect()
}

fn display_breakdown(report: &Report) -> String {
    let target_currency = report.currency.to_string();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell(&format!("Total ({target_currency})")),
        ui::header_cell("Share (%)"),
    ]);

    for (category, (total, share)) in category_shares(report) {
        table.add_row(vec![
            Cell::new(category),
            ui::amount_cell(total),
            ui::percentage_cell(share),
        ]);
    }

    let mut output = format!(
        "Expense distribution for {}\n\n",
        ui::style_text(
            &format!("{:04}-{:02}", report.year, report.month),
            ui::StyleType::Title
        )
    );
    if report.is_empty() {
        output.push_str(&ui::style_text(
            "No costs recorded for this month.",
            ui::StyleType::Subtle,
        ));
    } else {
        output.push_str(&table.to_string());
    }
    output.push_str("\n\n");
    output.push_str(&ui::total_line("Total", &target_currency, report.total_sum));
    output
}

pub async fn run(
    store: &dyn CostStore,
    rate_provider: &dyn RateProvider,
    year: i32,
    month: u32,
    currency: Currency,
) -> Result<()> {
    let rates = fetch_rates_with_progress(rate_provider).await;
    let report = get_report(store, year, month, currency, &rates)
        .await
        .context("Failed to load report")?;

    println!("{}", display_breakdown(&report));
    if let Some(note) = ui::rate_source_note(&rates) {
        println!("{note}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::CostRecord;
    use crate::core::rates::RateTable;
    use crate::core::report::build_report;
    use chrono::NaiveDate;

    fn record(id: u64, sum: f64, category: Category) -> CostRecord {
        CostRecord {
            id,
            sum,
            currency: Currency::Usd,
            category,
            description: "item".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        }
    }

    #[test]
    fn test_category_shares() {
        let report = build_report(
            vec![
                record(1, 30.0, Category::Food),
                record(2, 10.0, Category::Food),
                record(3, 60.0, Category::Housing),
            ],
            2024,
            4,
            Currency::Usd,
            &RateTable::fallback(),
        )
        .unwrap();

        let shares = category_shares(&report);
        assert_eq!(shares[&Category::Food], (40.0, 40.0));
        assert_eq!(shares[&Category::Housing], (60.0, 60.0));

        let output = display_breakdown(&report);
        assert!(output.contains("Housing"));
        assert!(output.contains("60.00%"));
    }

    #[test]
    fn test_empty_report_has_no_shares() {
        let report = build_report(vec![], 2024, 4, Currency::Usd, &RateTable::fallback()).unwrap();
        assert!(category_shares(&report).is_empty());
    }
}
