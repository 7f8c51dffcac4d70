use anyhow::Result;
use climate_risk_api::{
    router, AnalysisService, BoundaryRule, GeoapifyClient, RiskAnalyzer, RiskZoneStore,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const ZONES: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"name": "bay-flood"},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-123.0, 37.0], [-122.0, 37.0], [-122.0, 38.0], [-123.0, 38.0], [-123.0, 37.0]]]
        }
    }]
}"#;

fn write_zones(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

/// 在隨機埠啟動服務並回傳 base URL
async fn spawn_app(store: RiskZoneStore, geocoder_url: String, boundary: BoundaryRule) -> Result<String> {
    let geocoder = Arc::new(GeoapifyClient::new(geocoder_url, Some("test-key".to_string())));
    let service = AnalysisService::new(Arc::new(store), geocoder, RiskAnalyzer::new(boundary));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(service)).await;
    });

    Ok(format!("http://{}", addr))
}

fn features(coords: &[[f64; 2]]) -> Value {
    let features: Vec<Value> = coords
        .iter()
        .map(|c| json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": c}}))
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

#[tokio::test]
async fn test_address_inside_risk_zone() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    let geo_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/geocode/search")
            .query_param("text", "1600 Amphitheatre Parkway")
            .query_param("apiKey", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(features(&[[-122.084, 37.422], [10.0, 10.0]]));
    });

    let base = spawn_app(
        RiskZoneStore::load(zones.path()),
        server.url("/v1/geocode/search"),
        BoundaryRule::Exclusive,
    )
    .await?;

    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .query(&[("address", "1600 Amphitheatre Parkway")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    geo_mock.assert();

    assert_eq!(
        body,
        json!({
            "address": "1600 Amphitheatre Parkway",
            "coordinates": {"lat": 37.422, "lon": -122.084},
            "risk_detected": true,
            "message": "Asset located in high-risk zone",
            "data_provider": "Geoapify"
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_address_outside_risk_zones() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(features(&[[2.3522, 48.8566]]));
    });

    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .json(&json!({"address": "Paris"}))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["risk_detected"], false);
    assert_eq!(body["message"], "Asset is in a low-risk zone");
    assert_eq!(body["coordinates"]["lat"], 48.8566);
    assert_eq!(body["coordinates"]["lon"], 2.3522);
    Ok(())
}

#[tokio::test]
async fn test_blank_query_address_falls_back_to_body() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    let geo_mock = server.mock(|when, then| {
        when.method(GET).path("/search").query_param("text", "Paris");
        then.status(200).json_body(features(&[[2.3522, 48.8566]]));
    });

    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .query(&[("address", "")])
        .json(&json!({"address": "Paris"}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    geo_mock.assert();
    assert_eq!(body["address"], "Paris");
    assert_eq!(body["risk_detected"], false);
    Ok(())
}

#[tokio::test]
async fn test_empty_feature_list_is_404() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(json!({"type": "FeatureCollection", "features": []}));
    });

    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .query(&[("address", "Nowhere Address XYZ")])
        .send()
        .await?;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"detail": "Address not found."}));
    Ok(())
}

#[tokio::test]
async fn test_provider_error_is_500_with_detail() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(401).body("Invalid apiKey");
    });

    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .query(&[("address", "somewhere")])
        .send()
        .await?;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await?;
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(detail.starts_with("Geoapify API error: HTTP 401"), "detail was {}", detail);
    Ok(())
}

#[tokio::test]
async fn test_unloaded_risk_data_is_500_without_geocoding() -> Result<()> {
    let server = MockServer::start();
    let geo_mock = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(features(&[[-122.084, 37.422]]));
    });

    let store = RiskZoneStore::load("/nonexistent/risk_zones.geojson");
    let base = spawn_app(store, server.url("/search"), BoundaryRule::Exclusive).await?;
    let client = reqwest::Client::new();

    for address in ["1600 Amphitheatre Parkway", "Nowhere Address XYZ"] {
        let response = client
            .post(format!("{}/analyze", base))
            .query(&[("address", address)])
            .send()
            .await?;

        assert_eq!(response.status(), 500);
        let body: Value = response.json().await?;
        assert_eq!(body["detail"], "Risk map not initialized.");
    }

    geo_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_missing_address_is_422() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .send()
        .await?;

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["detail"], "Missing required parameter: address");
    Ok(())
}

#[tokio::test]
async fn test_boundary_point_follows_configured_rule() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(features(&[[-122.5, 37.0]]));
    });

    let client = reqwest::Client::new();
    for (rule, expected) in [(BoundaryRule::Exclusive, false), (BoundaryRule::Inclusive, true)] {
        let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), rule).await?;
        let body: Value = client
            .post(format!("{}/analyze", base))
            .query(&[("address", "edge of the zone")])
            .send()
            .await?
            .json()
            .await?;

        assert_eq!(body["risk_detected"], expected, "rule {:?}", rule);
    }
    Ok(())
}

#[tokio::test]
async fn test_health_reports_store_state() -> Result<()> {
    let zones = write_zones(ZONES)?;
    let server = MockServer::start();
    let client = reqwest::Client::new();

    let base = spawn_app(RiskZoneStore::load(zones.path()), server.url("/search"), BoundaryRule::Exclusive).await?;
    let body: Value = client.get(format!("{}/health", base)).send().await?.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["risk_zones_loaded"], true);
    assert_eq!(body["risk_zone_count"], 1);

    let base = spawn_app(
        RiskZoneStore::Unavailable("missing".to_string()),
        server.url("/search"),
        BoundaryRule::Exclusive,
    )
    .await?;
    let response = client.get(format!("{}/health", base)).send().await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["risk_zone_count"], 0);
    Ok(())
}
