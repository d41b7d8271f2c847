pub mod add;
pub mod categories;
pub mod rates;
pub mod report;
pub mod settings;
pub mod setup;
pub mod ui;
pub mod yearly;
