use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJsonError(#[from] geojson::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Risk data error: {message}")]
    RiskDataError { message: String },

    #[error("Unsupported coordinate reference system: {crs}")]
    UnsupportedCrs { crs: String },
}

impl RiskApiError {
    /// 給使用者看的簡短說明
    pub fn user_friendly_message(&self) -> String {
        match self {
            RiskApiError::IoError(e) => format!("無法讀取檔案: {}", e),
            RiskApiError::SerializationError(_) | RiskApiError::GeoJsonError(_) => {
                "資料格式不正確".to_string()
            }
            RiskApiError::HttpClientError(_) => "無法建立 HTTP 客戶端".to_string(),
            RiskApiError::ConfigError { message } => format!("配置錯誤: {}", message),
            RiskApiError::ConfigValidationError { field, message } => {
                format!("配置欄位 '{}' 無效: {}", field, message)
            }
            RiskApiError::InvalidConfigValueError { field, reason, .. } => {
                format!("配置欄位 '{}' 無效: {}", field, reason)
            }
            RiskApiError::RiskDataError { message } => format!("風險區域資料錯誤: {}", message),
            RiskApiError::UnsupportedCrs { crs } => format!("不支援的座標參考系統: {}", crs),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RiskApiError::IoError(_) => "Check that the file exists and is readable",
            RiskApiError::SerializationError(_) | RiskApiError::GeoJsonError(_) => {
                "Validate the file as GeoJSON (RFC 7946)"
            }
            RiskApiError::HttpClientError(_) => "Check TLS and proxy settings",
            RiskApiError::ConfigError { .. }
            | RiskApiError::ConfigValidationError { .. }
            | RiskApiError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            RiskApiError::RiskDataError { .. } => {
                "Make sure the risk zone file contains Polygon or MultiPolygon features"
            }
            RiskApiError::UnsupportedCrs { .. } => {
                "Only EPSG:4326 (CRS84) and EPSG:3857 are accepted; reproject the file to EPSG:4326"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskApiError>;

/// 地理編碼服務的錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("no match for address")]
    NotFound,

    #[error("{0}")]
    Provider(String),
}

/// 單次分析請求的失敗情況，對應到 HTTP 狀態碼
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    #[error("Risk map not initialized.")]
    RiskDataUnavailable,

    #[error("Address not found.")]
    AddressNotFound,

    #[error("Geoapify API error: {0}")]
    GeocodingFailed(String),
}

impl From<GeocodeError> for AnalyzeError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound => AnalyzeError::AddressNotFound,
            GeocodeError::Provider(detail) => AnalyzeError::GeocodingFailed(detail),
        }
    }
}
