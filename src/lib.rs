pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::cost::{Currency, NewCost};
use crate::providers::HttpRateProvider;
use anyhow::Result;
use chrono::{Datelike, Local};
use std::path::PathBuf;
use tracing::{debug, info};

/// Month selection shared by the reporting commands; `None` means "current".
#[derive(Debug, Clone, Default)]
pub struct PeriodArgs {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub currency: Option<Currency>,
}

/// Year selection for the yearly summary; `None` means "current".
#[derive(Debug, Clone, Default)]
pub struct YearArgs {
    pub year: Option<i32>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsArgs {
    pub rates_url: Option<String>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Add(NewCost),
    Report(PeriodArgs),
    Categories(PeriodArgs),
    Yearly(YearArgs),
    Rates,
    Settings(SettingsArgs),
}

fn config_file_path(config_path: Option<&str>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => AppConfig::default_config_path(),
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Cost manager starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rate_provider = HttpRateProvider::new(config.rates_url());
    let today = Local::now().date_naive();
    let resolve = |period: &PeriodArgs| {
        (
            period.year.unwrap_or(today.year()),
            period.month.unwrap_or(today.month()),
            period.currency.unwrap_or(config.currency),
        )
    };

    // Only commands that read or write costs touch the store
    match command {
        AppCommand::Add(input) => {
            let store = store::open(&config)?;
            cli::add::run(store.as_ref(), input).await
        }
        AppCommand::Report(period) => {
            let (year, month, currency) = resolve(&period);
            let store = store::open(&config)?;
            cli::report::run(store.as_ref(), &rate_provider, year, month, currency).await
        }
        AppCommand::Categories(period) => {
            let (year, month, currency) = resolve(&period);
            let store = store::open(&config)?;
            cli::categories::run(store.as_ref(), &rate_provider, year, month, currency).await
        }
        AppCommand::Yearly(args) => {
            let year = args.year.unwrap_or(today.year());
            let currency = args.currency.unwrap_or(config.currency);
            let store = store::open(&config)?;
            cli::yearly::run(store.as_ref(), &rate_provider, year, currency).await
        }
        AppCommand::Rates => cli::rates::run(&rate_provider).await,
        AppCommand::Settings(args) => {
            let path = config_file_path(config_path)?;
            cli::settings::run(config, &path, args)
        }
    }
}
