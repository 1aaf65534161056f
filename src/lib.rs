pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{http::HttpFlightApi, storage::FileSessionStore};
pub use config::Settings;
pub use core::{
    engine::BookingEngine,
    pricing::{compute_dynamic_fare, quote_flight, FareInputs, FareQuote, DEFAULT_DEMAND_INDEX},
    session::SessionContext,
};
pub use utils::error::{Result, SimError};
