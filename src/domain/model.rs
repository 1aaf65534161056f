use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Backend timestamps are ISO-8601; naive ones (no offset) are read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: i64,
    pub flight_number: String,
    #[serde(default)]
    pub airline_id: Option<i64>,
    #[serde(default)]
    pub airline_name: Option<String>,
    #[serde(default)]
    pub source_airport: Option<String>,
    #[serde(default)]
    pub destination_airport: Option<String>,
    #[serde(with = "timestamp")]
    pub departure_time: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub arrival_time: DateTime<Utc>,
    pub base_fare: f64,
    pub total_seats: i64,
    pub available_seats: i64,
    #[serde(default)]
    pub flight_type: Option<String>,
    #[serde(default)]
    pub travel_date: Option<NaiveDate>,
    #[serde(default)]
    pub dynamic_price: Option<f64>,
}

impl Flight {
    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }

    /// Fractional days until departure; negative once the flight has left.
    pub fn days_until(&self, now: DateTime<Utc>) -> f64 {
        (self.departure_time - now).num_milliseconds() as f64 / 86_400_000.0
    }

    pub fn route_label(&self) -> String {
        format!(
            "{} → {}",
            self.source_airport.as_deref().unwrap_or("?"),
            self.destination_airport.as_deref().unwrap_or("?")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAvailability {
    pub flight_id: i64,
    pub total_seats: i64,
    pub available_seats: i64,
    #[serde(default)]
    pub available_seat_numbers: Vec<u32>,
    #[serde(default, alias = "unavailableSeats", alias = "unavailable")]
    pub unavailable_seats: Vec<String>,
}

/// Seat map width used for row/letter labels such as `2C`.
pub const SEATS_PER_ROW: u32 = 6;

impl SeatAvailability {
    pub fn is_unavailable(&self, seat: &str) -> bool {
        self.unavailable_seats
            .iter()
            .any(|taken| taken.eq_ignore_ascii_case(seat))
    }

    /// Whether `seat` is among `available_seat_numbers`. An empty list means
    /// the backend did not enumerate seats, so every seat passes.
    pub fn is_offered(&self, seat: &str) -> bool {
        if self.available_seat_numbers.is_empty() {
            return true;
        }
        seat_number(seat).is_some_and(|n| self.available_seat_numbers.contains(&n))
    }
}

/// Maps a seat label to the backend's 1-based seat number: `"9"` is seat 9,
/// `"2C"` is row 2 letter C, i.e. seat 9 on a six-abreast map.
pub fn seat_number(seat: &str) -> Option<u32> {
    let seat = seat.trim();
    if let Ok(n) = seat.parse::<u32>() {
        return (n > 0).then_some(n);
    }

    let letter = seat.chars().last()?.to_ascii_uppercase();
    let row: u32 = seat[..seat.len() - letter.len_utf8()].parse().ok()?;
    if row == 0 || !letter.is_ascii_uppercase() {
        return None;
    }
    let column = letter as u32 - 'A' as u32 + 1;
    if column > SEATS_PER_ROW {
        return None;
    }
    Some((row - 1) * SEATS_PER_ROW + column)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub flight_id: i64,
    pub flight_number: String,
    pub dynamic_price: f64,
    pub base_fare: f64,
    pub available_seats: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub airport_id: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarePoint {
    #[serde(with = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    pub price: f64,
}

/// Identity of the logged-in passenger, as returned by login/signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub passenger_id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A traveller entered for an itinerary (not necessarily the account holder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerDetails {
    pub full_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub flight_id: i64,
    pub passenger_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare_paid: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    Paid,
    PaymentFailed,
    Cancelled,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::PendingPayment => "PENDING_PAYMENT",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Paid => "PAID",
            BookingStatus::PaymentFailed => "PAYMENT_FAILED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "PENDING_PAYMENT" | "PENDING" => BookingStatus::PendingPayment,
            "CONFIRMED" => BookingStatus::Confirmed,
            "PAID" => BookingStatus::Paid,
            "PAYMENT_FAILED" => BookingStatus::PaymentFailed,
            "CANCELLED" | "CANCELED" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(raw),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub flight_id: Option<i64>,
    pub flight_number: Option<String>,
    pub airline_name: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub departure_time: Option<DateTime<Utc>>,
}

impl FlightLeg {
    pub fn route_label(&self) -> String {
        format!(
            "{} → {}",
            self.source.as_deref().unwrap_or("?"),
            self.destination.as_deref().unwrap_or("?")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookedPassenger {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub seat_no: Option<String>,
    pub return_seat_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnewayBooking {
    pub pnr: Option<String>,
    pub booking_id: Option<i64>,
    pub status: BookingStatus,
    #[serde(default, with = "timestamp::option")]
    pub booking_date: Option<DateTime<Utc>>,
    pub passenger_id: Option<i64>,
    pub leg: FlightLeg,
    pub passengers: Vec<BookedPassenger>,
    pub fare_paid: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTripBooking {
    /// Outbound PNR first, return PNR second when the backend issued two.
    pub pnrs: Vec<String>,
    pub booking_id: Option<i64>,
    pub status: BookingStatus,
    #[serde(default, with = "timestamp::option")]
    pub booking_date: Option<DateTime<Utc>>,
    pub passenger_id: Option<i64>,
    pub outbound: FlightLeg,
    pub inbound: FlightLeg,
    pub passengers: Vec<BookedPassenger>,
    pub total_fare: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trip_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Booking {
    #[serde(rename = "ONE_WAY")]
    Oneway(OnewayBooking),
    RoundTrip(RoundTripBooking),
}

impl Booking {
    /// The reference used for pay/cancel calls.
    pub fn pnr(&self) -> Option<&str> {
        match self {
            Booking::Oneway(b) => b.pnr.as_deref(),
            Booking::RoundTrip(b) => b.pnrs.first().map(String::as_str),
        }
    }

    pub fn status(&self) -> &BookingStatus {
        match self {
            Booking::Oneway(b) => &b.status,
            Booking::RoundTrip(b) => &b.status,
        }
    }

    pub fn booking_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Booking::Oneway(b) => b.booking_date,
            Booking::RoundTrip(b) => b.booking_date,
        }
    }

    pub fn passenger_id(&self) -> Option<i64> {
        match self {
            Booking::Oneway(b) => b.passenger_id,
            Booking::RoundTrip(b) => b.passenger_id,
        }
    }

    pub fn passengers(&self) -> &[BookedPassenger] {
        match self {
            Booking::Oneway(b) => &b.passengers,
            Booking::RoundTrip(b) => &b.passengers,
        }
    }

    pub fn route_label(&self) -> String {
        match self {
            Booking::Oneway(b) => b.leg.route_label(),
            Booking::RoundTrip(b) => format!(
                "{} ⇄ {}",
                b.outbound.route_label(),
                b.inbound.route_label()
            ),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Booking::Oneway(b) => b.fare_paid,
            Booking::RoundTrip(b) => b.total_fare,
        }
    }

    pub fn is_round_trip(&self) -> bool {
        matches!(self, Booking::RoundTrip(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub message: String,
    pub pnr: String,
    pub status: BookingStatus,
}

impl PaymentOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == BookingStatus::Paid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub message: String,
    pub pnr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_flight_accepts_naive_backend_timestamps() {
        let flight: Flight = serde_json::from_value(serde_json::json!({
            "flight_id": 7,
            "flight_number": "AD123",
            "airline_name": "Air Demo",
            "source_airport": "Delhi",
            "destination_airport": "Mumbai",
            "departure_time": "2025-11-20T08:00:00",
            "arrival_time": "2025-11-20T10:00:00",
            "base_fare": 3500.0,
            "total_seats": 120,
            "available_seats": 12
        }))
        .unwrap();

        assert_eq!(
            flight.departure_time,
            Utc.with_ymd_and_hms(2025, 11, 20, 8, 0, 0).unwrap()
        );
        assert_eq!(flight.duration(), Duration::hours(2));
        assert!(flight.dynamic_price.is_none());
        assert_eq!(flight.route_label(), "Delhi → Mumbai");
    }

    #[test]
    fn test_days_until_is_fractional_and_signed() {
        let flight: Flight = serde_json::from_value(serde_json::json!({
            "flight_id": 1,
            "flight_number": "X1",
            "departure_time": "2025-11-20T12:00:00Z",
            "arrival_time": "2025-11-20T14:00:00Z",
            "base_fare": 1000,
            "total_seats": 100,
            "available_seats": 50
        }))
        .unwrap();

        let before = Utc.with_ymd_and_hms(2025, 11, 18, 0, 0, 0).unwrap();
        assert!((flight.days_until(before) - 2.5).abs() < 1e-9);

        let after = Utc.with_ymd_and_hms(2025, 11, 21, 12, 0, 0).unwrap();
        assert!((flight.days_until(after) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_booking_status_is_case_insensitive() {
        assert_eq!(BookingStatus::from("Cancelled".to_string()), BookingStatus::Cancelled);
        assert_eq!(BookingStatus::from("CANCELED".to_string()), BookingStatus::Cancelled);
        assert_eq!(
            BookingStatus::from("pending payment".to_string()),
            BookingStatus::PendingPayment
        );
        assert_eq!(
            BookingStatus::from("ON_HOLD".to_string()),
            BookingStatus::Other("ON_HOLD".to_string())
        );
    }

    #[test]
    fn test_seat_availability_aliases() {
        let seats: SeatAvailability = serde_json::from_value(serde_json::json!({
            "flight_id": 3,
            "total_seats": 48,
            "available_seats": 46,
            "unavailableSeats": ["1A", "2B"]
        }))
        .unwrap();
        assert!(seats.is_unavailable("1a"));
        assert!(!seats.is_unavailable("3C"));
        assert!(seats.available_seat_numbers.is_empty());
        assert!(seats.is_offered("8F"));
    }

    #[test]
    fn test_offered_seats_follow_backend_numbers() {
        let seats: SeatAvailability = serde_json::from_value(serde_json::json!({
            "flight_id": 1,
            "total_seats": 120,
            "available_seats": 9,
            "available_seat_numbers": [1, 2, 3, 4, 5, 6, 7, 8, 9]
        }))
        .unwrap();

        assert!(seats.is_offered("1A"));
        assert!(seats.is_offered("2c"));
        assert!(seats.is_offered("9"));
        assert!(!seats.is_offered("2D"));
        assert!(!seats.is_offered("10"));
        assert!(!seats.is_offered("1G"));
        assert!(!seats.is_offered("window"));
    }

    #[test]
    fn test_seat_number_labels() {
        assert_eq!(seat_number("1A"), Some(1));
        assert_eq!(seat_number("2C"), Some(9));
        assert_eq!(seat_number("8f"), Some(48));
        assert_eq!(seat_number("12"), Some(12));
        assert_eq!(seat_number("0"), None);
        assert_eq!(seat_number("0A"), None);
        assert_eq!(seat_number("C"), None);
        assert_eq!(seat_number(""), None);
    }
}
