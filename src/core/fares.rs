//! Per-passenger fare breakdown for the fare summary and the receipt.

use crate::core::pricing::{quote_flight, FareQuote};
use crate::domain::model::{Flight, PassengerDetails};
use crate::utils::error::{Result, SimError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Itinerary {
    pub outbound: Flight,
    pub inbound: Option<Flight>,
    pub passengers: Vec<PassengerDetails>,
}

impl Itinerary {
    pub fn is_round_trip(&self) -> bool {
        self.inbound.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareLine {
    pub passenger: String,
    pub outbound_fare: i64,
    pub return_fare: Option<i64>,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub outbound_flight: String,
    pub return_flight: Option<String>,
    pub outbound_quote: FareQuote,
    pub return_quote: Option<FareQuote>,
    pub lines: Vec<FareLine>,
    pub total: i64,
}

impl FareBreakdown {
    /// Every passenger on a leg pays that leg's displayed price.
    pub fn build(itinerary: &Itinerary, now: DateTime<Utc>, demand_index: f64) -> Result<Self> {
        if itinerary.passengers.is_empty() {
            return Err(SimError::ValidationError {
                message: "an itinerary needs at least one passenger".to_string(),
            });
        }

        let outbound_quote = quote_flight(&itinerary.outbound, now, demand_index);
        let return_quote = itinerary
            .inbound
            .as_ref()
            .map(|flight| quote_flight(flight, now, demand_index));

        let lines: Vec<FareLine> = itinerary
            .passengers
            .iter()
            .map(|passenger| {
                let return_fare = return_quote.map(|q| q.price);
                FareLine {
                    passenger: passenger.full_name.clone(),
                    outbound_fare: outbound_quote.price,
                    return_fare,
                    subtotal: outbound_quote.price + return_fare.unwrap_or(0),
                }
            })
            .collect();
        let total = lines.iter().map(|line| line.subtotal).sum();

        tracing::debug!(
            passengers = lines.len(),
            round_trip = itinerary.is_round_trip(),
            total,
            "Built fare breakdown"
        );

        Ok(Self {
            outbound_flight: itinerary.outbound.flight_number.clone(),
            return_flight: itinerary.inbound.as_ref().map(|f| f.flight_number.clone()),
            outbound_quote,
            return_quote,
            lines,
            total,
        })
    }
}
