use crate::core::analyzer::BoundaryRule;
use crate::utils::error::{Result, RiskApiError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub data: Option<DataSection>,
    pub geocoder: Option<GeocoderSection>,
    pub analysis: Option<AnalysisSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub risk_zones_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub boundary: Option<BoundaryRule>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RiskApiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RiskApiError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEOAPIFY_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RiskApiError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.bind.as_deref())
    }

    pub fn risk_zones_path(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.risk_zones_path.as_deref())
    }

    pub fn geocoder_endpoint(&self) -> Option<&str> {
        self.geocoder.as_ref().and_then(|g| g.endpoint.as_deref())
    }

    /// 尚未替換的 `${VAR}` 視為未設定
    pub fn api_key(&self) -> Option<&str> {
        self.geocoder
            .as_ref()
            .and_then(|g| g.api_key.as_deref())
            .filter(|key| !key.starts_with("${"))
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.geocoder.as_ref().and_then(|g| g.timeout_seconds)
    }

    pub fn boundary(&self) -> Option<BoundaryRule> {
        self.analysis.as_ref().and_then(|a| a.boundary)
    }
}
