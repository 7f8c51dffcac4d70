use clap::Parser;
use climate_risk_api::config;
use climate_risk_api::core::ConfigProvider;
use climate_risk_api::utils::{logger, validation::Validate};
use climate_risk_api::{
    router, AnalysisService, CliArgs, GeoapifyClient, RiskAnalyzer, RiskZoneStore, ServerConfig,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 先載入 .env，讓 RUST_LOG 與 GEOAPIFY_API_KEY 生效
    let dotenv = config::load_dotenv(args.env_file.as_deref().map(Path::new));

    // 初始化日誌
    logger::init_logger(args.verbose, args.log_json);

    tracing::info!("🚀 Starting climate-risk-api");
    match dotenv {
        Ok(Some(path)) => tracing::info!("📁 Loaded environment from {}", path.display()),
        Ok(None) => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("⚠️ Failed to load env file: {}", e),
    }

    let config = match ServerConfig::resolve(&args).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!(
        "Config: bind={}, data={}, geocoder={}, api_key_set={}",
        config.bind,
        config.risk_zones_path,
        config.geocoder_endpoint,
        config.api_key.is_some()
    );

    // 載入失敗時以降級模式繼續執行
    let store = Arc::new(RiskZoneStore::load(config.risk_zones_path()));
    let geocoder = Arc::new(GeoapifyClient::from_config(&config)?);
    let analyzer = RiskAnalyzer::new(config.boundary);
    tracing::info!("   Boundary rule: {:?}", analyzer.boundary());

    let service = AnalysisService::new(store, geocoder, analyzer);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🌍 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
