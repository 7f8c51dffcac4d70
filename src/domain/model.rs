use serde::{Deserialize, Serialize};

pub const DATA_PROVIDER: &str = "Geoapify";
pub const HIGH_RISK_MESSAGE: &str = "Asset located in high-risk zone";
pub const LOW_RISK_MESSAGE: &str = "Asset is in a low-risk zone";

/// WGS84 經緯度座標 (經度在前)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for Coordinates {
    fn from(c: Coordinate) -> Self {
        Self { lat: c.lat, lon: c.lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub address: String,
    pub coordinates: Coordinates,
    pub risk_detected: bool,
    pub message: String,
    pub data_provider: String,
}

impl AnalysisResult {
    pub fn new(address: impl Into<String>, coordinate: Coordinate, risk_detected: bool) -> Self {
        let message = if risk_detected {
            HIGH_RISK_MESSAGE
        } else {
            LOW_RISK_MESSAGE
        };

        Self {
            address: address.into(),
            coordinates: coordinate.into(),
            risk_detected,
            message: message.to_string(),
            data_provider: DATA_PROVIDER.to_string(),
        }
    }
}
