use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default endpoint of the HERE geocoding v1 API.
pub const DEFAULT_ENDPOINT: &str = "https://geocode.search.hereapi.com/v1/geocode";

/// Coordinates use 6 decimal places, matching the persisted columns.
const COORDINATE_SCALE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: Decimal,
    pub lng: Decimal,
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("geocoding provider returned non-success status: {0}")]
    Provider(reqwest::StatusCode),
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Resolves a free-text address into coordinates.
///
/// `Ok(None)` means the provider found no match for the address. That is a
/// valid outcome, not an error; callers store null coordinates for it.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(
        &self,
        street: &str,
        postal_code: &str,
        city: &str,
    ) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Client for the HERE geocoding API.
///
/// The API key is supplied at construction; nothing is read from ambient
/// process configuration.
pub struct HereGeocoder {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl HereGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the client at a different endpoint, e.g. a local stub server.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize)]
struct HereResponse {
    #[serde(default)]
    items: Vec<HereItem>,
}

#[derive(Deserialize)]
struct HereItem {
    position: HerePosition,
}

#[derive(Deserialize)]
struct HerePosition {
    lat: f64,
    lng: f64,
}

/// Join the address parts with single spaces. The street may be empty.
fn build_query(street: &str, postal_code: &str, city: &str) -> String {
    [street, postal_code, city].join(" ").trim().to_string()
}

fn to_decimal(value: f64) -> Result<Decimal, GeocodeError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(COORDINATE_SCALE))
        .ok_or_else(|| GeocodeError::Malformed(format!("non-finite coordinate: {value}")))
}

impl TryFrom<HerePosition> for Coordinates {
    type Error = GeocodeError;

    fn try_from(position: HerePosition) -> Result<Self, Self::Error> {
        Ok(Coordinates {
            lat: to_decimal(position.lat)?,
            lng: to_decimal(position.lng)?,
        })
    }
}

#[async_trait]
impl Geocoder for HereGeocoder {
    async fn geocode(
        &self,
        street: &str,
        postal_code: &str,
        city: &str,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        let query = build_query(street, postal_code, city);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Provider(status));
        }

        let body: HereResponse = response
            .json()
            .await
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;

        match body.items.into_iter().next() {
            Some(item) => Ok(Some(item.position.try_into()?)),
            None => Ok(None),
        }
    }
}
