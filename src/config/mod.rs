pub mod toml_config;

use crate::adapters::geoapify::DEFAULT_ENDPOINT;
use crate::core::analyzer::BoundaryRule;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};
use toml_config::TomlConfig;

pub const API_KEY_ENV: &str = "GEOAPIFY_API_KEY";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_RISK_ZONES_PATH: &str = "data/risk_zones.geojson";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "climate-risk-api")]
#[command(about = "Geocode an address and check it against climate risk zones")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Dotenv file to load before reading the environment (default: ./.env)
    #[arg(long)]
    pub env_file: Option<String>,

    /// Socket address to listen on
    #[arg(long)]
    pub bind: Option<String>,

    /// GeoJSON file with risk zone polygons
    #[arg(long)]
    pub data_path: Option<String>,

    /// Geocoding search endpoint
    #[arg(long)]
    pub geocoder_endpoint: Option<String>,

    /// Whether points on a zone edge count as inside
    #[arg(long, value_enum)]
    pub boundary: Option<BoundaryRule>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

/// 載入 `.env`，已存在的環境變數不會被覆蓋。
///
/// Runs before logging is set up, so the outcome is returned for the caller to log.
pub fn load_dotenv(path: Option<&Path>) -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => Ok(Some(path)),
        // 預設的 .env 不存在時略過
        Err(e) if e.not_found() && path.is_none() => Ok(None),
        Err(e) => Err(e),
    }
}

/// 合併後的最終配置：命令列 > TOML > 環境變數 > 預設值
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub risk_zones_path: String,
    pub geocoder_endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub boundary: BoundaryRule,
}

impl ServerConfig {
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        Ok(Self::from_sources(args, &file, std::env::var(API_KEY_ENV).ok()))
    }

    pub fn from_sources(args: &CliArgs, file: &TomlConfig, env_api_key: Option<String>) -> Self {
        Self {
            bind: args
                .bind
                .as_deref()
                .or(file.bind())
                .unwrap_or(DEFAULT_BIND)
                .to_string(),
            risk_zones_path: args
                .data_path
                .as_deref()
                .or(file.risk_zones_path())
                .unwrap_or(DEFAULT_RISK_ZONES_PATH)
                .to_string(),
            geocoder_endpoint: args
                .geocoder_endpoint
                .as_deref()
                .or(file.geocoder_endpoint())
                .unwrap_or(DEFAULT_ENDPOINT)
                .to_string(),
            api_key: file
                .api_key()
                .map(str::to_string)
                .or(env_api_key)
                .filter(|key| !key.trim().is_empty()),
            timeout_seconds: file.timeout_seconds(),
            boundary: args.boundary.or(file.boundary()).unwrap_or_default(),
        }
    }
}

impl ConfigProvider for ServerConfig {
    fn bind_addr(&self) -> &str {
        &self.bind
    }

    fn risk_zones_path(&self) -> &str {
        &self.risk_zones_path
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder_endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", &self.bind)?;
        validation::validate_path("data.risk_zones_path", &self.risk_zones_path)?;
        validation::validate_url("geocoder.endpoint", &self.geocoder_endpoint)?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("geocoder.timeout_seconds", timeout, 1, 300)?;
        }

        // 缺少金鑰不阻止啟動，請求時才會回報錯誤
        if self.api_key.is_none() {
            tracing::warn!(
                "⚠️ {} is not set; every geocoding request will fail",
                API_KEY_ENV
            );
        }

        Ok(())
    }
}
