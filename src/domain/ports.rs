use crate::core::search::SearchQuery;
use crate::domain::model::{
    Airport, Booking, BookingRequest, CancelOutcome, FarePoint, Flight, LoginRequest, Passenger,
    PaymentOutcome, PriceResponse, SeatAvailability, SignupRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence for the logged-in identity.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<Passenger>>> + Send;
    fn save(&self, passenger: &Passenger) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn demand_index(&self) -> f64;
    fn session_path(&self) -> &str;
}

/// The simulator's REST backend. Every call is an independent request.
#[async_trait]
pub trait FlightApi: Send + Sync {
    async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<Flight>>;
    async fn list_flights(&self, skip: u32, limit: u32) -> Result<Vec<Flight>>;
    async fn get_flight(&self, flight_id: i64) -> Result<Flight>;
    async fn get_seats(&self, flight_id: i64) -> Result<SeatAvailability>;
    async fn get_price(&self, flight_id: i64) -> Result<PriceResponse>;
    async fn fare_history(&self, flight_id: i64) -> Result<Vec<FarePoint>>;
    async fn list_airports(&self) -> Result<Vec<Airport>>;

    async fn signup(&self, request: &SignupRequest) -> Result<Passenger>;
    async fn login(&self, request: &LoginRequest) -> Result<Passenger>;

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking>;
    async fn list_bookings(&self, passenger_id: Option<i64>) -> Result<Vec<Booking>>;
    async fn get_booking(&self, pnr: &str) -> Result<Booking>;
    async fn pay_booking(&self, pnr: &str) -> Result<PaymentOutcome>;
    async fn cancel_booking(&self, pnr: &str) -> Result<CancelOutcome>;
}
