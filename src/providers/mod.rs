pub mod rates_api;
pub mod util;

pub use rates_api::{DEFAULT_RATES_URL, HttpRateProvider, fetch_rates};
