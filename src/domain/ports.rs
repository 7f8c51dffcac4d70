use crate::domain::model::Coordinate;
use crate::utils::error::GeocodeError;
use async_trait::async_trait;

/// 地址 → 座標
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn risk_zones_path(&self) -> &str;
    fn geocoder_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> Option<u64>;
}
