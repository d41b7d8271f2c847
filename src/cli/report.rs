use super::ui;
use crate::core::cost::Currency;
use crate::core::rates::{RateProvider, RateTable};
use crate::core::report::{Report, get_report};
use crate::core::store::CostStore;
use anyhow::{Context, Result};
use comfy_table::Cell;

impl Report {
    pub fn display_as_table(&self) -> String {
        let target_currency = self.currency.to_string();

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Category"),
            ui::header_cell("Description"),
            ui::header_cell("Sum"),
            ui::header_cell(&format!("Converted ({target_currency})")),
        ]);

        for entry in &self.costs {
            let cost = &entry.cost;
            table.add_row(vec![
                Cell::new(cost.date),
                Cell::new(cost.category),
                Cell::new(&cost.description),
                Cell::new(format!("{:.2} {}", cost.sum, cost.currency))
                    .set_alignment(comfy_table::CellAlignment::Right),
                ui::amount_cell(entry.converted_sum),
            ]);
        }

        let mut output = format!(
            "Costs for {}\n\n",
            ui::style_text(
                &format!("{:04}-{:02}", self.year, self.month),
                ui::StyleType::Title
            )
        );

        if self.is_empty() {
            output.push_str(&ui::style_text(
                "No costs recorded for this month.",
                ui::StyleType::Subtle,
            ));
        } else {
            output.push_str(&table.to_string());
        }

        output.push_str("\n\n");
        output.push_str(&ui::total_line("Total", &target_currency, self.total_sum));
        output
    }
}

/// Fetches rates behind a spinner.
pub async fn fetch_rates_with_progress(rate_provider: &dyn RateProvider) -> RateTable {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let rates = rate_provider.fetch_rates().await;
    pb.finish_and_clear();
    rates
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

    println!("{}", report.display_as_table());
    if let Some(note) = ui::rate_source_note(&rates) {
        println!("{note}");
    }
    Ok(())
}
