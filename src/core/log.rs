use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "costman";

/// Level for the app's own events. Warnings (rate fallback, discarded writes)
/// are always shown; `verbose` adds debug output.
fn app_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Restricts output to the app's target. Dependency crates stay silent
/// unless `RUST_LOG` names them.
fn app_targets(verbose: bool) -> Targets {
    Targets::new().with_target(APP_TARGET, app_level(verbose))
}

/// Installs the global subscriber on stderr; `RUST_LOG` takes precedence
/// over `verbose`.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app_level(verbose).to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_targets(verbose))
        .with(env_filter)
        .init();
}
