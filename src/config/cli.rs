use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::report::OutputFormat;
use crate::core::search::{SortBy, SortOrder};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "fare-sim")]
#[command(about = "Search, price and book flights against the flight-booking simulator backend")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Where the logged-in passenger is remembered between runs
    #[arg(long, global = true)]
    pub session_file: Option<String>,

    /// Demand signal in [0, 1] fed to the fare calculator
    #[arg(long, global = true)]
    pub demand_index: Option<f64>,

    #[arg(long, value_enum, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Price a seat from inventory numbers without contacting the backend
    Quote {
        #[arg(long)]
        base_fare: f64,
        #[arg(long)]
        seats_left: i64,
        #[arg(long)]
        total_seats: i64,
        #[arg(long, allow_hyphen_values = true)]
        days_until: f64,
    },
    /// Search flights and show their current prices
    Search {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Travel date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        sort_by: Option<SortBy>,
        #[arg(long, value_enum, default_value = "asc")]
        order: SortOrder,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// List all flights a page at a time
    Flights {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one flight with its current price
    Flight { flight_id: i64 },
    /// Show seat availability for a flight
    Seats { flight_id: i64 },
    /// Show the price the backend itself quotes for a flight
    Price { flight_id: i64 },
    /// Show recorded fares for a flight
    History { flight_id: i64 },
    /// List known airports
    Airports,
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in passenger
    Whoami,
    /// Book one or more seats on a flight at the displayed fare
    Book {
        flight_id: i64,
        #[arg(long = "seat", required = true)]
        seats: Vec<String>,
    },
    /// Show one booking by PNR
    Booking { pnr: String },
    Pay { pnr: String },
    Cancel { pnr: String },
    /// List the logged-in passenger's bookings
    Bookings,
    /// Per-passenger fare summary for a one-way or round-trip itinerary
    Breakdown {
        outbound_flight: i64,
        #[arg(long)]
        return_flight: Option<i64>,
        #[arg(long = "passenger", required = true)]
        passengers: Vec<String>,
    },
}

impl CliConfig {
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading configuration from {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(base_url) = &self.api_base_url {
            settings.api_base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(path) = &self.session_file {
            settings.session_path = path.clone();
        }
        if let Some(demand_index) = self.demand_index {
            settings.demand_index = demand_index;
        }
        if self.json_logs {
            settings.json_logs = true;
        }

        Ok(settings)
    }
}
