pub mod analyzer;
pub mod risk_zones;
pub mod service;

pub use crate::domain::model::{AnalysisResult, Coordinate, Coordinates};
pub use crate::domain::ports::{ConfigProvider, Geocoder};
pub use crate::utils::error::Result;
