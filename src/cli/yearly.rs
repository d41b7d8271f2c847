use super::report::fetch_rates_with_progress;
use super::ui;
use crate::core::cost::Currency;
use crate::core::rates::RateProvider;
use crate::core::report::{YearlyReport, get_yearly_report};
use crate::core::store::CostStore;
use anyhow::{Context, Result};
use comfy_table::Cell;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const BAR_WIDTH: usize = 30;

/// Horizontal bar proportional to `value / max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.max(1))
}

impl YearlyReport {
    pub fn display_as_table(&self) -> String {
        let target_currency = self.currency.to_string();
        let max = self.monthly_totals.iter().copied().fold(0.0, f64::max);

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell(&format!("Total ({target_currency})")),
            ui::header_cell(""),
        ]);

        for (label, total) in MONTH_LABELS.iter().zip(self.monthly_totals) {
            table.add_row(vec![
                Cell::new(label),
                ui::amount_cell(total),
                Cell::new(bar(total, max)).fg(comfy_table::Color::Blue),
            ]);
        }

        format!(
            "Monthly trend for {}\n\n{}\n\n{}",
            ui::style_text(&self.year.to_string(), ui::StyleType::Title),
            table,
            ui::total_line("Annual Total", &target_currency, self.annual_total)
        )
    }
}

pub async fn run(
    store: &dyn CostStore,
    rate_provider: &dyn RateProvider,
    year: i32,
    currency: Currency,
) -> Result<()> {
    let rates = fetch_rates_with_progress(rate_provider).await;
    let yearly = get_yearly_report(store, year, currency, &rates)
        .await
        .context("Failed to load yearly report")?;

    println!("{}", yearly.display_as_table());
    if let Some(note) = ui::rate_source_note(&rates) {
        println!("{note}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0.0, 100.0), "");
        assert_eq!(bar(10.0, 0.0), "");
        assert_eq!(bar(100.0, 100.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(50.0, 100.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0.01, 100.0).chars().count(), 1);
    }

    #[test]
    fn test_display_as_table() {
        let mut monthly_totals = [0.0; 12];
        monthly_totals[2] = 114.71;
        monthly_totals[11] = 20.0;
        let yearly = YearlyReport {
            year: 2024,
            currency: Currency::Usd,
            monthly_totals,
            annual_total: 134.71,
        };

        let output = yearly.display_as_table();
        assert!(output.contains("2024"));
        assert!(output.contains("Mar"));
        assert!(output.contains("114.71"));
        assert!(output.contains("134.71"));
    }
}
