use crate::core::fares::{FareBreakdown, Itinerary};
use crate::core::pricing::{quote_flight, DEFAULT_DEMAND_INDEX};
use crate::core::search::{price_flights, sort_priced, PricedFlight, SearchQuery, MAX_PAGE_SIZE};
use crate::core::session::SessionContext;
use crate::domain::model::{
    Booking, BookingRequest, CancelOutcome, PassengerDetails, PaymentOutcome, SeatAvailability,
};
use crate::domain::ports::{FlightApi, SessionStore};
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{validate_range, Validate};
use chrono::{DateTime, Utc};

/// Drives the user-facing flows over a [`FlightApi`].
pub struct BookingEngine<A: FlightApi> {
    api: A,
    demand_index: f64,
}

impl<A: FlightApi> BookingEngine<A> {
    pub fn new(api: A) -> Self {
        Self::with_demand_index(api, DEFAULT_DEMAND_INDEX)
    }

    pub fn with_demand_index(api: A, demand_index: f64) -> Self {
        Self { api, demand_index }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn search(
        &self,
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<PricedFlight>> {
        query.validate()?;
        tracing::info!(
            "Searching flights {} → {}",
            query.origin.as_deref().unwrap_or("*"),
            query.destination.as_deref().unwrap_or("*")
        );

        let flights = self.api.search_flights(query).await?;
        let mut priced = price_flights(flights, now, self.demand_index);
        if let Some(sort_by) = query.sort_by {
            sort_priced(&mut priced, sort_by, query.order);
        }

        tracing::info!("Found {} flights", priced.len());
        Ok(priced)
    }

    /// One page of the unfiltered flight list, priced.
    pub async fn browse(
        &self,
        skip: u32,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PricedFlight>> {
        validate_range("flights.limit", limit, 1, MAX_PAGE_SIZE)?;
        let flights = self.api.list_flights(skip, limit).await?;
        Ok(price_flights(flights, now, self.demand_index))
    }

    pub async fn quote(&self, flight_id: i64, now: DateTime<Utc>) -> Result<PricedFlight> {
        let flight = self.api.get_flight(flight_id).await?;
        let quote = quote_flight(&flight, now, self.demand_index);
        tracing::debug!(
            "Flight {} quoted at {} ({:?})",
            flight_id,
            quote.price,
            quote.source
        );
        Ok(PricedFlight { flight, quote })
    }

    pub async fn seats(&self, flight_id: i64) -> Result<SeatAvailability> {
        self.api.get_seats(flight_id).await
    }

    /// Books one seat per entry in `seats` at the currently displayed fare.
    pub async fn book<S: SessionStore>(
        &self,
        session: &SessionContext<S>,
        flight_id: i64,
        seats: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let passenger = session.require()?;
        if seats.is_empty() {
            return Err(SimError::ValidationError {
                message: "select at least one seat".to_string(),
            });
        }

        for (i, seat) in seats.iter().enumerate() {
            if seats[..i].iter().any(|earlier| earlier.eq_ignore_ascii_case(seat)) {
                return Err(SimError::ValidationError {
                    message: format!("seat {} is selected more than once", seat),
                });
            }
        }

        let availability = self.api.get_seats(flight_id).await?;
        if let Some(taken) = seats
            .iter()
            .find(|seat| availability.is_unavailable(seat) || !availability.is_offered(seat))
        {
            return Err(SimError::ValidationError {
                message: format!("seat {} on flight {} is not available", taken, flight_id),
            });
        }
        if availability.available_seats < seats.len() as i64 {
            return Err(SimError::ValidationError {
                message: format!(
                    "flight {} has only {} seats left",
                    flight_id, availability.available_seats
                ),
            });
        }

        let priced = self.quote(flight_id, now).await?;
        let mut bookings = Vec::with_capacity(seats.len());
        for seat in seats {
            let request = BookingRequest {
                flight_id,
                passenger_id: passenger.passenger_id,
                seat_no: Some(seat.clone()),
                fare_paid: Some(priced.quote.price as f64),
            };
            let booking = match self.api.create_booking(&request).await {
                Ok(booking) => booking,
                Err(e) if bookings.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Seat {} failed after {} seat(s) were booked: {}",
                        seat,
                        bookings.len(),
                        e
                    );
                    return Err(SimError::PartialBooking {
                        booked: bookings,
                        source: Box::new(e),
                    });
                }
            };
            tracing::info!(
                "Booked seat {} on {} (PNR {})",
                seat,
                priced.flight.flight_number,
                booking.pnr().unwrap_or("-")
            );
            bookings.push(booking);
        }
        Ok(bookings)
    }

    pub async fn pay(&self, pnr: &str) -> Result<PaymentOutcome> {
        let outcome = self.api.pay_booking(pnr).await?;
        if outcome.succeeded() {
            tracing::info!("Payment for {} succeeded", pnr);
        } else {
            tracing::warn!("Payment for {} failed: {}", pnr, outcome.message);
        }
        Ok(outcome)
    }

    pub async fn cancel(&self, pnr: &str) -> Result<CancelOutcome> {
        let outcome = self.api.cancel_booking(pnr).await?;
        tracing::info!("Cancel {}: {}", pnr, outcome.message);
        Ok(outcome)
    }

    pub async fn my_bookings<S: SessionStore>(
        &self,
        session: &SessionContext<S>,
    ) -> Result<Vec<Booking>> {
        let passenger = session.require()?;
        let bookings = self.api.list_bookings(Some(passenger.passenger_id)).await?;
        // older backends ignore the filter
        Ok(bookings
            .into_iter()
            .filter(|b| b.passenger_id().map_or(true, |id| id == passenger.passenger_id))
            .collect())
    }

    pub async fn breakdown(
        &self,
        outbound_id: i64,
        return_id: Option<i64>,
        passengers: Vec<PassengerDetails>,
        now: DateTime<Utc>,
    ) -> Result<FareBreakdown> {
        let outbound = self.api.get_flight(outbound_id).await?;
        let inbound = match return_id {
            Some(id) => Some(self.api.get_flight(id).await?),
            None => None,
        };
        let itinerary = Itinerary {
            outbound,
            inbound,
            passengers,
        };
        FareBreakdown::build(&itinerary, now, self.demand_index)
    }
}
