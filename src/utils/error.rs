use crate::domain::model::Booking;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Backend returned {status}: {detail}")]
    BackendError { status: u16, detail: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unexpected booking payload: {message}")]
    PayloadShapeError { message: String },

    #[error("No passenger is logged in")]
    NotLoggedIn,

    /// Some seats were booked before a later seat failed. `booked` holds the
    /// bookings the backend already committed.
    #[error("Booked {} seat(s) before failing: {source}", .booked.len())]
    PartialBooking {
        booked: Vec<Booking>,
        source: Box<SimError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Configuration,
    Data,
    Session,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::PartialBooking { source, .. } => source.category(),
            SimError::ApiError(_) => ErrorCategory::Network,
            SimError::BackendError { .. } => ErrorCategory::Backend,
            SimError::UrlError(_)
            | SimError::ConfigError { .. }
            | SimError::ConfigValidationError { .. }
            | SimError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SimError::CsvError(_)
            | SimError::SerializationError(_)
            | SimError::ValidationError { .. }
            | SimError::PayloadShapeError { .. } => ErrorCategory::Data,
            SimError::NotLoggedIn => ErrorCategory::Session,
            SimError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SimError::PartialBooking { .. } => ErrorSeverity::High,
            SimError::NotLoggedIn => ErrorSeverity::Low,
            SimError::ApiError(_) => ErrorSeverity::Medium,
            SimError::BackendError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            SimError::BackendError { .. }
            | SimError::ValidationError { .. }
            | SimError::PayloadShapeError { .. }
            | SimError::SerializationError(_)
            | SimError::CsvError(_) => ErrorSeverity::High,
            SimError::UrlError(_)
            | SimError::ConfigError { .. }
            | SimError::ConfigValidationError { .. }
            | SimError::InvalidConfigValueError { .. }
            | SimError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Transport failures and 5xx answers may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SimError::ApiError(e) => e.is_timeout() || e.is_connect(),
            SimError::BackendError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SimError::ApiError(_) => "Could not reach the booking backend".to_string(),
            SimError::BackendError { status: 404, detail } => format!("Not found: {}", detail),
            SimError::BackendError { detail, .. } => {
                format!("The backend refused the request: {}", detail)
            }
            SimError::NotLoggedIn => "You must login or signup before booking a seat".to_string(),
            SimError::PartialBooking { booked, source } => {
                let pnrs: Vec<&str> = booked.iter().filter_map(Booking::pnr).collect();
                format!(
                    "Only {} seat(s) were booked ({}); the next one failed: {}",
                    booked.len(),
                    pnrs.join(", "),
                    source.user_friendly_message()
                )
            }
            SimError::PayloadShapeError { .. } => {
                "The backend sent a booking this client does not understand".to_string()
            }
            SimError::ValidationError { message } => message.clone(),
            SimError::UrlError(_)
            | SimError::ConfigError { .. }
            | SimError::ConfigValidationError { .. }
            | SimError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            SimError::IoError(_) | SimError::SerializationError(_) | SimError::CsvError(_) => {
                self.to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the backend is running and --api-base-url points at it"
            }
            ErrorCategory::Backend => "Check the flight id or PNR and try again",
            ErrorCategory::Configuration => "Fix the configuration file or command line options",
            ErrorCategory::Data => {
                "Check the input values; if they come from the backend, report the payload"
            }
            ErrorCategory::Session => "Run `fare-sim login` first",
            ErrorCategory::Io => "Check file permissions and that the parent directory exists",
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_split_on_status() {
        let server = SimError::BackendError {
            status: 503,
            detail: "down".to_string(),
        };
        assert_eq!(server.category(), ErrorCategory::Backend);
        assert_eq!(server.severity(), ErrorSeverity::Medium);
        assert!(server.is_retryable());

        let client = SimError::BackendError {
            status: 400,
            detail: "No seats available".to_string(),
        };
        assert_eq!(client.severity(), ErrorSeverity::High);
        assert!(!client.is_retryable());
        assert!(client.user_friendly_message().contains("No seats available"));
    }

    #[test]
    fn test_partial_booking_keeps_committed_pnrs() {
        let booked: Vec<Booking> = serde_json::from_value(serde_json::json!([{
            "trip_type": "ONE_WAY",
            "pnr": "KEEPME01",
            "booking_id": 1,
            "status": "CONFIRMED",
            "passenger_id": 4,
            "leg": {},
            "passengers": [],
            "fare_paid": 5408.0
        }]))
        .unwrap();
        let err = SimError::PartialBooking {
            booked,
            source: Box::new(SimError::BackendError {
                status: 400,
                detail: "No seats available".to_string(),
            }),
        };

        assert_eq!(err.category(), ErrorCategory::Backend);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("Booked 1 seat(s) before failing"));
        let message = err.user_friendly_message();
        assert!(message.contains("KEEPME01"));
        assert!(message.contains("No seats available"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_session_error_is_low_severity() {
        assert_eq!(SimError::NotLoggedIn.severity(), ErrorSeverity::Low);
        assert_eq!(SimError::NotLoggedIn.category(), ErrorCategory::Session);
        assert!(SimError::NotLoggedIn.recovery_suggestion().contains("login"));
    }
}
