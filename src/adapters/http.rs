use crate::core::normalize::{normalize_booking, normalize_bookings};
use crate::core::search::SearchQuery;
use crate::domain::model::{
    Airport, Booking, BookingRequest, CancelOutcome, FarePoint, Flight, LoginRequest, Passenger,
    PaymentOutcome, PriceResponse, SeatAvailability, SignupRequest,
};
use crate::domain::ports::{ConfigProvider, FlightApi};
use crate::utils::error::{Result, SimError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpFlightApi {
    client: Client,
    base_url: Url,
}

impl HttpFlightApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(SimError::ConfigError {
                message: format!("'{}' cannot be used as a base URL", base_url),
            });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            Duration::from_secs(config.request_timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SimError::ConfigError {
                message: format!("'{}' cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        handle_response(response).await
    }

    async fn post_json<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("POST {}", url);
        let request = self.client.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        handle_response(request.send().await?).await
    }
}

/// Non-2xx answers carry a FastAPI style `{"detail": ...}` body when the
/// backend produced them, plain text otherwise.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    tracing::debug!("Response status: {}", status);

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Object(body)) => match body.get("detail") {
                Some(serde_json::Value::String(detail)) => detail.clone(),
                Some(other) => other.to_string(),
                None => text.clone(),
            },
            _ => text.clone(),
        };
        let detail = if detail.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            detail
        };
        return Err(SimError::BackendError {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(response.json().await?)
}

#[async_trait]
impl FlightApi for HttpFlightApi {
    async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<Flight>> {
        self.get_json(&["search"], &query.to_query_pairs()).await
    }

    async fn list_flights(&self, skip: u32, limit: u32) -> Result<Vec<Flight>> {
        let query = [("skip", skip.to_string()), ("limit", limit.to_string())];
        self.get_json(&["flights"], &query).await
    }

    async fn get_flight(&self, flight_id: i64) -> Result<Flight> {
        self.get_json(&["flights", &flight_id.to_string()], &[]).await
    }

    async fn get_seats(&self, flight_id: i64) -> Result<SeatAvailability> {
        self.get_json(&["flights", &flight_id.to_string(), "seats"], &[])
            .await
    }

    async fn get_price(&self, flight_id: i64) -> Result<PriceResponse> {
        self.get_json(&["flights", &flight_id.to_string(), "price"], &[])
            .await
    }

    async fn fare_history(&self, flight_id: i64) -> Result<Vec<FarePoint>> {
        self.get_json(&["flights", &flight_id.to_string(), "fare_history"], &[])
            .await
    }

    async fn list_airports(&self) -> Result<Vec<Airport>> {
        self.get_json(&["airports"], &[]).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<Passenger> {
        self.post_json(&["passengers", "signup"], Some(request)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Passenger> {
        self.post_json(&["passengers", "login"], Some(request)).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking> {
        let payload: serde_json::Value = self.post_json(&["bookings"], Some(request)).await?;
        normalize_booking(payload)
    }

    async fn list_bookings(&self, passenger_id: Option<i64>) -> Result<Vec<Booking>> {
        let query: Vec<(&str, String)> = passenger_id
            .map(|id| vec![("passenger_id", id.to_string())])
            .unwrap_or_default();
        let payload: serde_json::Value = self.get_json(&["bookings"], &query).await?;
        normalize_bookings(payload)
    }

    async fn get_booking(&self, pnr: &str) -> Result<Booking> {
        let payload: serde_json::Value = self.get_json(&["bookings", pnr], &[]).await?;
        normalize_booking(payload)
    }

    async fn pay_booking(&self, pnr: &str) -> Result<PaymentOutcome> {
        self.post_json::<(), _>(&["bookings", pnr, "pay"], None).await
    }

    async fn cancel_booking(&self, pnr: &str) -> Result<CancelOutcome> {
        self.post_json::<(), _>(&["bookings", pnr, "cancel"], None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpFlightApi::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            api.endpoint(&["flights", "7", "seats"]).unwrap().as_str(),
            "http://localhost:8000/api/flights/7/seats"
        );

        let bare = HttpFlightApi::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            bare.endpoint(&["bookings", "AB 12", "cancel"]).unwrap().as_str(),
            "http://localhost:8000/bookings/AB%2012/cancel"
        );
    }

    #[test]
    fn test_rejects_non_base_urls() {
        assert!(HttpFlightApi::new("mailto:ops@example.com", Duration::from_secs(5)).is_err());
        assert!(HttpFlightApi::new("not a url", Duration::from_secs(5)).is_err());
    }
}
