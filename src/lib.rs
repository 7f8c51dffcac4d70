pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::geoapify::GeoapifyClient;
pub use crate::adapters::http::router;
pub use crate::config::{CliArgs, ServerConfig};
pub use crate::core::analyzer::{BoundaryRule, RiskAnalyzer};
pub use crate::core::risk_zones::{RiskZoneCollection, RiskZoneStore};
pub use crate::core::service::AnalysisService;
pub use crate::utils::error::{AnalyzeError, GeocodeError, Result, RiskApiError};
