use crate::domain::model::Coordinate;
use crate::domain::ports::{ConfigProvider, Geocoder};
use crate::utils::error::{GeocodeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.geoapify.com/v1/geocode/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Option<Vec<Feature>>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<f64>,
}

/// Geoapify 自由格式地址搜尋
#[derive(Debug, Clone)]
pub struct GeoapifyClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeoapifyClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.geocoder_endpoint().to_string(),
            api_key: config.api_key().map(str::to_string),
        })
    }

    fn parse_first_match(body: &str) -> std::result::Result<Coordinate, GeocodeError> {
        let response: SearchResponse = serde_json::from_str(body)
            .map_err(|e| GeocodeError::Provider(format!("invalid response body: {}", e)))?;

        let first = match response.features {
            Some(features) if !features.is_empty() => features.into_iter().next(),
            _ => return Err(GeocodeError::NotFound),
        };

        // Geoapify 回傳 [lon, lat]
        match first.and_then(|f| f.geometry).map(|g| g.coordinates) {
            Some(coords) if coords.len() >= 2 => Ok(Coordinate::new(coords[0], coords[1])),
            _ => Err(GeocodeError::Provider(
                "first feature has no [lon, lat] coordinates".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Geocoder for GeoapifyClient {
    async fn geocode(&self, address: &str) -> std::result::Result<Coordinate, GeocodeError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeocodeError::Provider("missing API key (GEOAPIFY_API_KEY)".to_string()))?;

        tracing::debug!("Making geocoding request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("text", address), ("apiKey", api_key)])
            .send()
            .await
            .map_err(|e| GeocodeError::Provider(e.without_url().to_string()))?;

        let status = response.status();
        tracing::debug!("Geocoding response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Provider(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(GeocodeError::Provider(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        Self::parse_first_match(&body)
    }
}
