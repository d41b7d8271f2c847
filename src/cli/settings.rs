use crate::SettingsArgs;
use crate::core::config::AppConfig;
use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

/// Applies `args` to `config` and persists it at `path`.
pub fn run(mut config: AppConfig, path: &Path, args: SettingsArgs) -> Result<()> {
    if args.rates_url.is_none() && args.currency.is_none() {
        println!("Config file: {}", path.display());
        println!("Rates URL: {}", config.rates_url());
        println!("Display currency: {}", config.currency);
        return Ok(());
    }

    if let Some(url) = args.rates_url {
        let url = url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("Rates URL must start with http:// or https://, got: {url}");
        }
        config.rates_url = Some(url);
    }
    if let Some(currency) = args.currency {
        config.currency = currency;
    }

    config.save_to_path(path)?;
    info!("Saved settings to {}", path.display());
    println!("Settings saved to {}", path.display());
    Ok(())
}
