use crate::core::pricing::{quote_flight, FareQuote};
use crate::domain::model::Flight;
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Price,
    Duration,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Price => "price",
            SortBy::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub travel_date: Option<NaiveDate>,
    pub sort_by: Option<SortBy>,
    pub order: SortOrder,
    pub skip: u32,
    pub limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            travel_date: None,
            sort_by: None,
            order: SortOrder::Asc,
            skip: 0,
            limit: 20,
        }
    }
}

impl SearchQuery {
    pub fn route(origin: &str, destination: &str) -> Self {
        Self {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            ..Self::default()
        }
    }

    pub fn on(mut self, travel_date: NaiveDate) -> Self {
        self.travel_date = Some(travel_date);
        self
    }

    pub fn sorted(mut self, sort_by: SortBy, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self.order = order;
        self
    }

    /// Parses the `YYYY-MM-DD` form the backend expects.
    pub fn parse_travel_date(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| SimError::ValidationError {
            message: format!("travel date '{}' must be YYYY-MM-DD: {}", raw, e),
        })
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(origin) = self.origin.as_deref().filter(|o| !o.trim().is_empty()) {
            pairs.push(("origin", origin.trim().to_string()));
        }
        if let Some(destination) = self.destination.as_deref().filter(|d| !d.trim().is_empty()) {
            pairs.push(("destination", destination.trim().to_string()));
        }
        if let Some(date) = self.travel_date {
            pairs.push(("travel_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by", sort_by.as_str().to_string()));
            pairs.push(("order", self.order.as_str().to_string()));
        }
        pairs.push(("skip", self.skip.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

impl Validate for SearchQuery {
    fn validate(&self) -> Result<()> {
        if let Some(origin) = &self.origin {
            validate_non_empty_string("search.origin", origin)?;
        }
        if let Some(destination) = &self.destination {
            validate_non_empty_string("search.destination", destination)?;
        }
        validate_range("search.limit", self.limit, 1, MAX_PAGE_SIZE)?;
        Ok(())
    }
}

/// A flight together with the price shown for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedFlight {
    pub flight: Flight,
    pub quote: FareQuote,
}

pub fn price_flights(
    flights: Vec<Flight>,
    now: DateTime<Utc>,
    demand_index: f64,
) -> Vec<PricedFlight> {
    flights
        .into_iter()
        .map(|flight| {
            let quote = quote_flight(&flight, now, demand_index);
            PricedFlight { flight, quote }
        })
        .collect()
}

/// Orders by the displayed price (not the base fare) so the list reads
/// consistently with what each card shows. Stable for ties.
pub fn sort_priced(flights: &mut [PricedFlight], sort_by: SortBy, order: SortOrder) {
    flights.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Price => a.quote.price.cmp(&b.quote.price),
            SortBy::Duration => a.flight.duration().cmp(&b.flight.duration()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

pub fn cheapest(flights: &[PricedFlight]) -> Option<&PricedFlight> {
    flights.iter().min_by_key(|p| p.quote.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pricing::PriceSource;
    use chrono::{Duration, TimeZone};

    fn flight(
        id: i64,
        base_fare: f64,
        seats_left: i64,
        minutes: i64,
        now: DateTime<Utc>,
    ) -> Flight {
        let departure_time = now + Duration::days(20);
        Flight {
            flight_id: id,
            flight_number: format!("FS{}", id),
            airline_id: None,
            airline_name: None,
            source_airport: Some("Delhi".to_string()),
            destination_airport: Some("Mumbai".to_string()),
            departure_time,
            arrival_time: departure_time + Duration::minutes(minutes),
            base_fare,
            total_seats: 120,
            available_seats: seats_left,
            flight_type: None,
            travel_date: None,
            dynamic_price: None,
        }
    }

    #[test]
    fn test_query_pairs() {
        let query = SearchQuery::route(" Delhi ", "Mumbai")
            .on(NaiveDate::from_ymd_opt(2025, 11, 20).unwrap())
            .sorted(SortBy::Duration, SortOrder::Desc);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("origin", "Delhi".to_string()),
                ("destination", "Mumbai".to_string()),
                ("travel_date", "2025-11-20".to_string()),
                ("sort_by", "duration".to_string()),
                ("order", "desc".to_string()),
                ("skip", "0".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_validation() {
        assert!(SearchQuery::route("Delhi", "Mumbai").validate().is_ok());
        assert!(SearchQuery::route("", "Mumbai").validate().is_err());

        let too_many = SearchQuery {
            limit: 51,
            ..SearchQuery::default()
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_parse_travel_date() {
        assert_eq!(
            SearchQuery::parse_travel_date("2025-11-20").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
        );
        assert!(SearchQuery::parse_travel_date("20/11/2025").is_err());
    }

    #[test]
    fn test_sort_by_displayed_price_not_base_fare() {
        let now = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        // nearly full flight with the lower base fare ends up dearer
        let flights = vec![flight(1, 3000.0, 2, 120, now), flight(2, 3300.0, 110, 150, now)];

        let mut priced = price_flights(flights, now, 0.2);
        assert!(priced.iter().all(|p| p.quote.source == PriceSource::Computed));
        sort_priced(&mut priced, SortBy::Price, SortOrder::Asc);
        assert_eq!(priced[0].flight.flight_id, 2);
        assert_eq!(cheapest(&priced).map(|p| p.flight.flight_id), Some(2));

        sort_priced(&mut priced, SortBy::Duration, SortOrder::Desc);
        assert_eq!(priced[0].flight.flight_id, 2);
        sort_priced(&mut priced, SortBy::Duration, SortOrder::Asc);
        assert_eq!(priced[0].flight.flight_id, 1);
    }
}
