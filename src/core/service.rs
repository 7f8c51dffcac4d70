use crate::core::analyzer::RiskAnalyzer;
use crate::core::risk_zones::RiskZoneStore;
use crate::domain::model::AnalysisResult;
use crate::domain::ports::Geocoder;
use crate::utils::error::AnalyzeError;
use std::sync::Arc;

/// 串接地理編碼與風險分析。每個請求彼此獨立，只共用唯讀的風險資料。
#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<RiskZoneStore>,
    geocoder: Arc<dyn Geocoder>,
    analyzer: RiskAnalyzer,
}

impl AnalysisService {
    pub fn new(store: Arc<RiskZoneStore>, geocoder: Arc<dyn Geocoder>, analyzer: RiskAnalyzer) -> Self {
        Self {
            store,
            geocoder,
            analyzer,
        }
    }

    pub fn store(&self) -> &RiskZoneStore {
        &self.store
    }

    pub async fn analyze(&self, address: &str) -> Result<AnalysisResult, AnalyzeError> {
        // 風險資料未載入時不呼叫外部服務
        let zones = self
            .store
            .collection()
            .ok_or(AnalyzeError::RiskDataUnavailable)?;

        let coordinate = self.geocoder.geocode(address).await?;
        tracing::debug!(
            "Geocoded '{}' to lon={}, lat={}",
            address,
            coordinate.lon,
            coordinate.lat
        );

        let zone = self.analyzer.matching_zone(zones, coordinate);
        if let Some(zone) = zone {
            tracing::info!(
                "⚠️ '{}' is inside risk zone {}",
                address,
                zone.name.as_deref().unwrap_or("<unnamed>")
            );
        }

        Ok(AnalysisResult::new(address, coordinate, zone.is_some()))
    }
}
