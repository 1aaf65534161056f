//! Dynamic fare calculator.
//!
//! A price rises with seat scarcity, with a caller-supplied demand signal and
//! in the last week before departure. A small deterministic jitter derived from
//! the inputs keeps displayed prices from looking static while staying
//! reproducible: the same inputs always give the same price.

use crate::domain::model::Flight;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEMAND_INDEX: f64 = 0.2;

const SCARCITY_WEIGHT: f64 = 0.5;
const DEMAND_WEIGHT: f64 = 0.4;
const LAST_MINUTE_WEIGHT: f64 = 0.6;
const LAST_MINUTE_WINDOW_DAYS: f64 = 7.0;
const LAST_MINUTE_HORIZON_DAYS: f64 = 30.0;
const JITTER_AMPLITUDE: f64 = 0.01;

/// Computes the simulated real-time price of a seat.
///
/// `total_seats <= 0` is divided as 1 so malformed zero-capacity records still
/// price to a number. `seats_left > total_seats` and negative `days_until` are
/// passed through as-is.
pub fn compute_dynamic_fare(
    base_fare: f64,
    seats_left: i64,
    total_seats: i64,
    days_until: f64,
    demand_index: f64,
) -> i64 {
    let seats_left = seats_left as f64;
    let total_seats = total_seats as f64;

    let scarcity = ((total_seats - seats_left) / total_seats.max(1.0)) * SCARCITY_WEIGHT;
    let demand = demand_index * DEMAND_WEIGHT;
    let time_factor = if days_until <= LAST_MINUTE_WINDOW_DAYS {
        (1.0 - days_until / LAST_MINUTE_HORIZON_DAYS) * LAST_MINUTE_WEIGHT
    } else {
        0.0
    };
    let multiplier = 1.0 + scarcity + demand + time_factor;
    let jitter = ((seats_left + days_until).sin() + 1.0) * JITTER_AMPLITUDE;

    round_half_up(base_fare * multiplier * (1.0 + jitter))
}

/// Rounds to the nearest integer, ties toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareInputs {
    pub base_fare: f64,
    pub seats_left: i64,
    pub total_seats: i64,
    pub days_until: f64,
    pub demand_index: f64,
}

impl FareInputs {
    pub fn new(base_fare: f64, seats_left: i64, total_seats: i64, days_until: f64) -> Self {
        Self {
            base_fare,
            seats_left,
            total_seats,
            days_until,
            demand_index: DEFAULT_DEMAND_INDEX,
        }
    }

    pub fn with_demand_index(mut self, demand_index: f64) -> Self {
        self.demand_index = demand_index;
        self
    }

    pub fn for_flight(flight: &Flight, now: DateTime<Utc>) -> Self {
        Self::new(
            flight.base_fare,
            flight.available_seats,
            flight.total_seats,
            flight.days_until(now),
        )
    }

    pub fn price(&self) -> i64 {
        compute_dynamic_fare(
            self.base_fare,
            self.seats_left,
            self.total_seats,
            self.days_until,
            self.demand_index,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Server,
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub price: i64,
    pub source: PriceSource,
}

/// The price to display for a flight. A backend-supplied `dynamic_price`
/// wins; the calculator is the fallback.
pub fn quote_flight(flight: &Flight, now: DateTime<Utc>, demand_index: f64) -> FareQuote {
    match flight.dynamic_price.filter(|p| p.is_finite() && *p > 0.0) {
        Some(server_price) => FareQuote {
            price: round_half_up(server_price),
            source: PriceSource::Server,
        },
        None => FareQuote {
            price: FareInputs::for_flight(flight, now)
                .with_demand_index(demand_index)
                .price(),
            source: PriceSource::Computed,
        },
    }
}
