use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use costman::core::cost::{Category, Currency, NewCost};
use costman::core::log::init_logging;
use costman::{AppCommand, PeriodArgs, SettingsArgs, YearArgs};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Period {
    /// Calendar year, defaults to the current year
    #[arg(short, long)]
    year: Option<i32>,

    /// Month 1-12, defaults to the current month
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Display currency (USD, ILS, GBP, EURO)
    #[arg(long)]
    currency: Option<Currency>,
}

impl From<Period> for PeriodArgs {
    fn from(p: Period) -> PeriodArgs {
        PeriodArgs {
            year: p.year,
            month: p.month,
            currency: p.currency,
        }
    }
}

#[derive(Args)]
struct YearPeriod {
    /// Calendar year, defaults to the current year
    #[arg(short, long)]
    year: Option<i32>,

    /// Display currency (USD, ILS, GBP, EURO)
    #[arg(long)]
    currency: Option<Currency>,
}

impl From<YearPeriod> for YearArgs {
    fn from(p: YearPeriod) -> YearArgs {
        YearArgs {
            year: p.year,
            currency: p.currency,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a new cost
    Add {
        /// Amount spent
        #[arg(short, long)]
        sum: f64,
        /// Currency of the amount (USD, ILS, GBP, EURO)
        #[arg(long, default_value = "USD")]
        currency: Currency,
        /// Food, Health, Housing, Sport, Education, Transportation or Other
        #[arg(long, default_value = "Other")]
        category: Category,
        /// What the money was spent on
        #[arg(short, long)]
        description: String,
        /// Date as YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Display the costs of a month
    Report(Period),
    /// Display a month's totals per category
    Categories(Period),
    /// Display per-month totals for a year
    Yearly(YearPeriod),
    /// Display the current exchange rates
    Rates,
    /// Show or update persisted preferences
    Settings {
        /// Exchange rates endpoint
        #[arg(long)]
        rates_url: Option<String>,
        /// Default display currency
        #[arg(long)]
        currency: Option<Currency>,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Add {
                sum,
                currency,
                category,
                description,
                date,
            } => AppCommand::Add(NewCost {
                sum,
                currency,
                category,
                description,
                date,
            }),
            Commands::Report(p) => AppCommand::Report(p.into()),
            Commands::Categories(p) => AppCommand::Categories(p.into()),
            Commands::Yearly(p) => AppCommand::Yearly(p.into()),
            Commands::Rates => AppCommand::Rates,
            Commands::Settings {
                rates_url,
                currency,
            } => AppCommand::Settings(SettingsArgs {
                rates_url,
                currency,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => costman::cli::setup::setup_at_path(path),
            None => costman::cli::setup::setup(),
        },
        Some(cmd) => costman::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
