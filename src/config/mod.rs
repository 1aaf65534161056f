#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::pricing::DEFAULT_DEMAND_INDEX;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_SESSION_PATH: &str = ".fare-sim/session.json";

/// Resolved settings: defaults, then the TOML file, then command line overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub demand_index: f64,
    pub session_path: String,
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            demand_index: DEFAULT_DEMAND_INDEX,
            session_path: DEFAULT_SESSION_PATH.to_string(),
            json_logs: false,
        }
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn demand_index(&self) -> f64 {
        self.demand_index
    }

    fn session_path(&self) -> &str {
        &self.session_path
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api_base_url)?;
        validate_positive_number("api.timeout_seconds", self.timeout_seconds, 1)?;
        validate_range("pricing.demand_index", self.demand_index, 0.0, 1.0)?;
        validate_path("session.path", &self.session_path)?;
        Ok(())
    }
}
