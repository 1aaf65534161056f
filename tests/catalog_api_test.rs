use anyhow::Result;
use chrono::{TimeZone, Utc};
use flight_fare_sim::domain::model::{Booking, BookingStatus, SignupRequest};
use flight_fare_sim::domain::ports::FlightApi;
use flight_fare_sim::{BookingEngine, HttpFlightApi, SimError};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn api(server: &MockServer) -> HttpFlightApi {
    HttpFlightApi::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_browse_pages_and_prices_flights() -> Result<()> {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/flights")
                .query_param("skip", "20")
                .query_param("limit", "10");
            then.status(200).json_body(json!([{
                "flight_id": 21,
                "flight_number": "FS21",
                "departure_time": "2025-11-26T00:00:00",
                "arrival_time": "2025-11-26T02:10:00",
                "base_fare": 3000.0,
                "total_seats": 120,
                "available_seats": 40
            }]));
        })
        .await;

    let engine = BookingEngine::new(api(&server));
    let now = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();

    let flights = engine.browse(20, 10, now).await?;
    list_mock.assert_async().await;
    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0].quote.price, 4317);
    assert_eq!(flights[0].flight.source_airport, None);

    let too_many = engine.browse(0, 500, now).await;
    assert!(matches!(too_many, Err(SimError::InvalidConfigValueError { .. })));
    list_mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_backend_price_and_fare_history() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/flights/7/price");
            then.status(200).json_body(json!({
                "flight_id": 7,
                "flight_number": "AD123",
                "dynamic_price": 5521.5,
                "base_fare": 3500.0,
                "available_seats": 12
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/flights/7/fare_history");
            then.status(200).json_body(json!([
                { "recorded_at": "2025-10-30T09:00:00", "price": 5100.0 },
                { "recorded_at": "2025-10-31T09:00:00.250", "price": 5260.0 }
            ]));
        })
        .await;

    let api = api(&server);
    let price = api.get_price(7).await?;
    assert_eq!(price.flight_number, "AD123");
    assert_eq!(price.dynamic_price, 5521.5);

    let history = api.fare_history(7).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[0].recorded_at,
        Utc.with_ymd_and_hms(2025, 10, 30, 9, 0, 0).unwrap()
    );
    assert_eq!(history[1].price, 5260.0);
    Ok(())
}

#[tokio::test]
async fn test_airports_and_signup() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/airports");
            then.status(200).json_body(json!([
                { "airport_id": 1, "city": "Delhi", "country": "India" },
                { "airport_id": 2, "city": "Mumbai" }
            ]));
        })
        .await;
    let signup_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/passengers/signup")
                .body_contains("\"full_name\":\"Asha Rao\"");
            then.status(201).json_body(json!({
                "passenger_id": 4, "full_name": "Asha Rao", "email": "asha@example.com"
            }));
        })
        .await;

    let api = api(&server);
    let airports = api.list_airports().await?;
    assert_eq!(airports.len(), 2);
    assert_eq!(airports[1].country, None);

    let passenger = api
        .signup(&SignupRequest {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            password: "secret".to_string(),
        })
        .await?;
    signup_mock.assert_async().await;
    assert_eq!(passenger.passenger_id, 4);
    assert_eq!(passenger.phone, None);
    Ok(())
}

#[tokio::test]
async fn test_get_booking_unwraps_nested_record() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/AB12CD34");
            then.status(200).json_body(json!({
                "pnr": "AB12CD34",
                "booking": {
                    "booking_id": 51,
                    "status": "pending_payment",
                    "fare_paid": "5408.00",
                    "flight": { "flightNo": "AD123", "from": "Delhi", "to": "Mumbai" }
                }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/GONE0000");
            then.status(404);
        })
        .await;

    let api = api(&server);
    let booking = api.get_booking("AB12CD34").await?;
    match &booking {
        Booking::Oneway(b) => {
            assert_eq!(b.pnr.as_deref(), Some("AB12CD34"));
            assert_eq!(b.booking_id, Some(51));
            assert_eq!(b.fare_paid, Some(5408.0));
            assert_eq!(b.leg.flight_number.as_deref(), Some("AD123"));
        }
        other => panic!("expected a one-way booking, got {:?}", other),
    }
    assert_eq!(booking.status(), &BookingStatus::PendingPayment);
    assert_eq!(booking.route_label(), "Delhi → Mumbai");

    match api.get_booking("GONE0000").await {
        Err(SimError::BackendError { status, detail }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Not Found");
        }
        other => panic!("expected a backend error, got {:?}", other),
    }
    Ok(())
}
