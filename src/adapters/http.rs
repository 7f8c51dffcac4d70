//! HTTP surface: `POST /analyze` and `GET /health`.

use crate::core::service::AnalysisService;
use crate::domain::model::AnalysisResult;
use crate::utils::error::AnalyzeError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

pub const MISSING_ADDRESS_DETAIL: &str = "Missing required parameter: address";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub risk_zones_loaded: bool,
    pub risk_zone_count: usize,
    pub version: String,
}

pub enum ApiError {
    Analyze(AnalyzeError),
    MissingAddress,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Analyze(AnalyzeError::AddressNotFound) => StatusCode::NOT_FOUND,
            ApiError::Analyze(AnalyzeError::RiskDataUnavailable)
            | ApiError::Analyze(AnalyzeError::GeocodingFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingAddress => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Analyze(err) => err.to_string(),
            ApiError::MissingAddress => MISSING_ADDRESS_DETAIL.to_string(),
        }
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        ApiError::Analyze(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: AnalysisService) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// 地址可以放在 query string (`?address=...`) 或 JSON body
async fn analyze(
    State(service): State<AnalysisService>,
    Query(query): Query<AnalyzeQuery>,
    body: Option<Json<AnalyzeBody>>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .or_else(|| body.and_then(|Json(b)| b.address))
        .filter(|a| !a.trim().is_empty())
        .ok_or(ApiError::MissingAddress)?;

    match service.analyze(&address).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::warn!("❌ Analysis failed for '{}': {}", address, e);
            Err(e.into())
        }
    }
}

async fn health(State(service): State<AnalysisService>) -> Json<HealthResponse> {
    let store = service.store();
    let status = if store.is_ready() { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        risk_zones_loaded: store.is_ready(),
        risk_zone_count: store.zone_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ApiError::from(AnalyzeError::AddressNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AnalyzeError::RiskDataUnavailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AnalyzeError::GeocodingFailed("timeout".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::MissingAddress.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_error_detail() {
        let err = ApiError::from(AnalyzeError::GeocodingFailed("HTTP 401".to_string()));
        assert_eq!(err.detail(), "Geoapify API error: HTTP 401");
        assert_eq!(
            ApiError::from(AnalyzeError::AddressNotFound).detail(),
            "Address not found."
        );
    }
}
