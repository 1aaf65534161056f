//! Booking payloads arrive in several shapes: flat list rows, `BookingOut`
//! records, front-end style records with a nested `flight` object, and
//! round-trip records carrying `passengers[]`, `flights[]` and `pnrs[]`.
//! They are folded into [`Booking`] once, here, at the API boundary.

use crate::domain::model::{
    timestamp, BookedPassenger, Booking, BookingStatus, FlightLeg, OnewayBooking, RoundTripBooking,
};
use crate::utils::error::{Result, SimError};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

pub fn normalize_bookings(payload: Value) -> Result<Vec<Booking>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("bookings") {
            Some(Value::Array(items)) => items,
            _ => return Err(shape("expected a list of bookings or an object with `bookings`")),
        },
        other => {
            return Err(shape(format!(
                "expected a list of bookings, got {}",
                kind(&other)
            )))
        }
    };

    items.into_iter().map(normalize_booking).collect()
}

pub fn normalize_booking(payload: Value) -> Result<Booking> {
    let mut obj = match payload {
        Value::Object(obj) => obj,
        other => return Err(shape(format!("expected a booking object, got {}", kind(&other)))),
    };

    // `{ "pnr": ..., "booking": { ... } }` wraps the record
    if let Some(Value::Object(inner)) = obj.remove("booking") {
        let mut merged = inner;
        for (key, value) in obj {
            merged.entry(key).or_insert(value);
        }
        obj = merged;
    }

    if is_round_trip(&obj) {
        round_trip(&obj).map(Booking::RoundTrip)
    } else {
        oneway(&obj).map(Booking::Oneway)
    }
}

fn is_round_trip(obj: &Object) -> bool {
    let tagged = str_field(obj, &["trip_type", "trip"])
        .map(|t| {
            let t = t.to_ascii_lowercase().replace(['-', ' '], "_");
            t == "round_trip" || t == "round" || t == "roundtrip"
        })
        .unwrap_or(false);

    tagged
        || array_len(obj, "flights") >= 2
        || array_len(obj, "pnrs") >= 2
        || obj.get("return_flight_id").is_some_and(|v| !v.is_null())
        || obj.get("return_flight").is_some_and(Value::is_object)
}

fn oneway(obj: &Object) -> Result<OnewayBooking> {
    let pnr = pnrs(obj).into_iter().next();
    let booking_id = i64_field(obj, &["booking_id"]);
    if pnr.is_none() && booking_id.is_none() {
        return Err(shape("booking carries neither a PNR nor a booking id"));
    }

    let leg = legs(obj).into_iter().next().unwrap_or_else(|| flat_leg(obj));

    Ok(OnewayBooking {
        pnr,
        booking_id,
        status: status(obj),
        booking_date: datetime_field(obj, &["booking_date", "created_at", "date"]),
        passenger_id: i64_field(obj, &["passenger_id"]),
        leg,
        passengers: passengers(obj),
        fare_paid: f64_field(obj, &["fare_paid", "amount_paid", "total_fare", "total"]),
    })
}

fn round_trip(obj: &Object) -> Result<RoundTripBooking> {
    let pnrs = pnrs(obj);
    let booking_id = i64_field(obj, &["booking_id"]);
    if pnrs.is_empty() && booking_id.is_none() {
        return Err(shape("booking carries neither a PNR nor a booking id"));
    }

    let mut legs = legs(obj).into_iter();
    let outbound = legs.next().unwrap_or_else(|| flat_leg(obj));
    let inbound = legs
        .next()
        .or_else(|| match obj.get("return_flight") {
            Some(Value::Object(flight)) => Some(leg(flight)),
            _ => None,
        })
        .unwrap_or_else(|| FlightLeg {
            flight_id: i64_field(obj, &["return_flight_id"]),
            ..FlightLeg::default()
        });

    Ok(RoundTripBooking {
        pnrs,
        booking_id,
        status: status(obj),
        booking_date: datetime_field(obj, &["booking_date", "created_at", "date"]),
        passenger_id: i64_field(obj, &["passenger_id"]),
        outbound,
        inbound,
        passengers: passengers(obj),
        total_fare: f64_field(obj, &["total_fare", "amount_paid", "total", "fare_paid"]),
    })
}

fn status(obj: &Object) -> BookingStatus {
    // the backend marks new bookings CONFIRMED; client-built records carry no status
    str_field(obj, &["status"])
        .map(BookingStatus::from)
        .unwrap_or(BookingStatus::Confirmed)
}

fn pnrs(obj: &Object) -> Vec<String> {
    let mut out: Vec<String> = match obj.get("pnrs") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    };
    for key in ["pnr", "return_pnr"] {
        if let Some(pnr) = obj.get(key).and_then(scalar_string) {
            if !out.contains(&pnr) {
                out.push(pnr);
            }
        }
    }
    out
}

fn legs(obj: &Object) -> Vec<FlightLeg> {
    if let Some(Value::Array(flights)) = obj.get("flights") {
        return flights
            .iter()
            .filter_map(Value::as_object)
            .map(leg)
            .collect();
    }
    if let Some(Value::Object(flight)) = obj.get("flight") {
        let mut nested = leg(flight);
        if nested.flight_id.is_none() {
            nested.flight_id = i64_field(obj, &["flight_id"]);
        }
        return vec![nested];
    }
    Vec::new()
}

fn leg(flight: &Object) -> FlightLeg {
    FlightLeg {
        flight_id: i64_field(flight, &["flight_id", "id"]),
        flight_number: str_field(flight, &["flight_number", "flightNo", "flight_no"]),
        airline_name: str_field(flight, &["airline_name", "airline"]),
        source: str_field(flight, &["source", "from", "source_airport", "source_city"]),
        destination: str_field(
            flight,
            &["destination", "to", "destination_airport", "destination_city"],
        ),
        departure_time: datetime_field(flight, &["departure_time", "departure"]),
    }
}

fn flat_leg(obj: &Object) -> FlightLeg {
    FlightLeg {
        flight_id: i64_field(obj, &["flight_id"]),
        flight_number: str_field(obj, &["flight_number"]),
        airline_name: str_field(obj, &["airline_name"]),
        source: str_field(obj, &["source", "source_airport", "source_city"]),
        destination: str_field(obj, &["destination", "destination_airport", "destination_city"]),
        departure_time: datetime_field(obj, &["departure_time"]),
    }
}

fn passengers(obj: &Object) -> Vec<BookedPassenger> {
    if let Some(Value::Array(items)) = obj.get("passengers") {
        return items
            .iter()
            .filter_map(Value::as_object)
            .map(|p| BookedPassenger {
                full_name: str_field(p, &["full_name", "name"]),
                age: i64_field(p, &["age"]).and_then(|age| u32::try_from(age).ok()),
                gender: str_field(p, &["gender"]),
                seat_no: str_field(p, &["seat_no", "seat"]),
                return_seat_no: str_field(p, &["return_seat_no"]),
            })
            .collect();
    }

    let holder = match obj.get("passenger") {
        Some(Value::Object(p)) => str_field(p, &["full_name", "name"]),
        _ => None,
    };

    if let Some(Value::Array(seats)) = obj.get("seats") {
        return seats
            .iter()
            .filter_map(scalar_string)
            .map(|seat| BookedPassenger {
                full_name: holder.clone(),
                seat_no: Some(seat),
                ..BookedPassenger::default()
            })
            .collect();
    }

    match str_field(obj, &["seat_no"]) {
        Some(seat) => vec![BookedPassenger {
            full_name: holder.or_else(|| str_field(obj, &["full_name", "passenger_name"])),
            seat_no: Some(seat),
            return_seat_no: str_field(obj, &["return_seat_no"]),
            ..BookedPassenger::default()
        }],
        None => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn str_field(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(scalar_string))
}

fn f64_field(obj: &Object, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn i64_field(obj: &Object, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn datetime_field(obj: &Object, keys: &[&str]) -> Option<chrono::DateTime<chrono::Utc>> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str).and_then(timestamp::parse))
}

fn array_len(obj: &Object, key: &str) -> usize {
    obj.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn shape(message: impl Into<String>) -> SimError {
    SimError::PayloadShapeError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_list_row() {
        let booking = normalize_booking(json!({
            "pnr": "AB12CD34",
            "status": "CONFIRMED",
            "fare_paid": "5408.00",
            "seat_no": 17,
            "booking_date": "2025-11-01T09:30:00",
            "flight_number": "AD123",
            "airline_name": "Air Demo",
            "source": "Delhi",
            "destination": "Mumbai",
            "passenger_id": 4
        }))
        .unwrap();

        let Booking::Oneway(b) = &booking else {
            panic!("expected a one-way booking, got {:?}", booking);
        };
        assert_eq!(b.pnr.as_deref(), Some("AB12CD34"));
        assert_eq!(b.fare_paid, Some(5408.0));
        assert_eq!(b.leg.route_label(), "Delhi → Mumbai");
        assert_eq!(b.passengers[0].seat_no.as_deref(), Some("17"));
        assert_eq!(booking.passenger_id(), Some(4));
        assert!(booking.booking_date().is_some());
    }

    #[test]
    fn test_front_end_shape_with_nested_flight_and_seats() {
        let booking = normalize_booking(json!({
            "pnr": "PNRX1Y2Z3",
            "booking": {
                "flight": { "id": 9, "airline": "Skyways", "flightNo": "SW456", "from": "DEL", "to": "BOM" },
                "seats": ["1A", "1B"],
                "passenger": { "name": "Asha" },
                "total": 17830
            }
        }))
        .unwrap();

        let Booking::Oneway(b) = &booking else {
            panic!("expected a one-way booking");
        };
        assert_eq!(booking.pnr(), Some("PNRX1Y2Z3"));
        assert_eq!(b.leg.flight_id, Some(9));
        assert_eq!(b.leg.flight_number.as_deref(), Some("SW456"));
        assert_eq!(b.passengers.len(), 2);
        assert_eq!(b.passengers[1].full_name.as_deref(), Some("Asha"));
        assert_eq!(b.fare_paid, Some(17830.0));
        assert_eq!(b.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_nested_round_trip() {
        let booking = normalize_booking(json!({
            "booking_id": 31,
            "status": "Cancelled",
            "trip_type": "ROUND_TRIP",
            "pnrs": ["OUT12345", "RET67890"],
            "flights": [
                { "flight_id": 1, "flight_number": "AD123", "source": "Delhi", "destination": "Mumbai" },
                { "flight_id": 2, "flight_number": "AD124", "source": "Mumbai", "destination": "Delhi" }
            ],
            "passengers": [
                { "full_name": "Asha", "age": 31, "gender": "F", "seat_no": "3C", "return_seat_no": "4D" }
            ],
            "total_fare": 10816
        }))
        .unwrap();

        let Booking::RoundTrip(b) = &booking else {
            panic!("expected a round-trip booking");
        };
        assert_eq!(booking.pnr(), Some("OUT12345"));
        assert_eq!(b.pnrs.len(), 2);
        assert_eq!(b.inbound.flight_number.as_deref(), Some("AD124"));
        assert_eq!(b.passengers[0].age, Some(31));
        assert_eq!(b.passengers[0].return_seat_no.as_deref(), Some("4D"));
        assert_eq!(booking.status(), &BookingStatus::Cancelled);
        assert_eq!(booking.route_label(), "Delhi → Mumbai ⇄ Mumbai → Delhi");
    }

    #[test]
    fn test_return_flight_id_marks_round_trip() {
        let booking = normalize_booking(json!({
            "booking_id": 8,
            "flight_id": 1,
            "return_flight_id": 2,
            "pnr": "ABCDEFGH",
            "status": "PAID"
        }))
        .unwrap();

        let Booking::RoundTrip(b) = booking else {
            panic!("expected a round-trip booking");
        };
        assert_eq!(b.outbound.flight_id, Some(1));
        assert_eq!(b.inbound.flight_id, Some(2));
        assert_eq!(b.status, BookingStatus::Paid);
    }

    #[test]
    fn test_rejects_unidentifiable_payloads() {
        assert!(matches!(
            normalize_booking(json!({ "status": "CONFIRMED" })),
            Err(SimError::PayloadShapeError { .. })
        ));
        assert!(normalize_booking(json!("AB12CD34")).is_err());
        assert!(normalize_bookings(json!({ "items": [] })).is_err());
    }

    #[test]
    fn test_list_wrappers() {
        let rows = json!([{ "pnr": "A1" }, { "booking_id": 2, "seat_no": "2A" }]);
        assert_eq!(normalize_bookings(rows.clone()).unwrap().len(), 2);
        assert_eq!(normalize_bookings(json!({ "bookings": rows })).unwrap().len(), 2);
        assert!(normalize_bookings(json!([])).unwrap().is_empty());
    }
}
