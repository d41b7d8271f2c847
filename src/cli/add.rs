use super::ui;
use crate::core::cost::{CostRecord, NewCost};
use crate::core::store::CostStore;
use anyhow::{Context, Result};
use comfy_table::Cell;

pub fn display_record(record: &CostRecord) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
        ui::header_cell("Sum"),
        ui::header_cell("Currency"),
    ]);
    table.add_row(vec![
        Cell::new(record.id),
        Cell::new(record.date),
        Cell::new(record.category),
        Cell::new(&record.description),
        ui::amount_cell(record.sum),
        Cell::new(record.currency),
    ]);

    format!(
        "{}\n\n{}",
        ui::style_text("Cost added", ui::StyleType::Title),
        table
    )
}

pub async fn run(store: &dyn CostStore, input: NewCost) -> Result<()> {
    let record = store
        .add_cost(input)
        .await
        .context("Failed to save cost")?;
    tracing::info!(id = record.id, "Added cost");
    println!("{}", display_record(&record));
    Ok(())
}
