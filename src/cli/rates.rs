use super::report::fetch_rates_with_progress;
use super::ui;
use crate::core::rates::{RateProvider, RateTable};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

fn display_rates(rates: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Per 1 USD")]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(format!("{rate:.4}")).set_alignment(CellAlignment::Right),
        ]);
    }

    format!(
        "Exchange rates ({})\n\n{}",
        ui::style_text(&rates.source.to_string(), ui::StyleType::Title),
        table
    )
}

pub async fn run(rate_provider: &dyn RateProvider) -> Result<()> {
    let rates = fetch_rates_with_progress(rate_provider).await;
    println!("{}", display_rates(&rates));
    if let Some(note) = ui::rate_source_note(&rates) {
        println!("{note}");
    }
    Ok(())
}
