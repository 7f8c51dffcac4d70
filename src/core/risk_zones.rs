//! Risk zone loading.
//!
//! Zones come from a GeoJSON file and are held in memory as WGS84
//! multipolygons. Files carrying a legacy `crs` member in Web Mercator are
//! reprojected on load; any other CRS is rejected.

use crate::utils::error::{Result, RiskApiError};
use geo::{BoundingRect, Coord, LineString, MapCoordsInPlace, MultiPolygon, Polygon, Rect};
use geojson::{GeoJson, Geometry, PolygonType, Value};
use std::f64::consts::PI;
use std::path::Path;

const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceCrs {
    Wgs84,
    WebMercator,
}

impl SourceCrs {
    fn from_name(name: &str) -> Result<Self> {
        // "EPSG:4326", "urn:ogc:def:crs:EPSG::3857", "urn:ogc:def:crs:OGC:1.3:CRS84"
        let code = name.rsplit(':').next().unwrap_or(name).trim();
        match code.to_ascii_uppercase().as_str() {
            "4326" | "CRS84" => Ok(SourceCrs::Wgs84),
            "3857" | "900913" | "3785" | "102100" => Ok(SourceCrs::WebMercator),
            _ => Err(RiskApiError::UnsupportedCrs {
                crs: name.to_string(),
            }),
        }
    }

    fn detect(raw: &serde_json::Value) -> Result<Self> {
        // `"crs": null` 與未提供相同
        let crs = match raw.get("crs") {
            None | Some(serde_json::Value::Null) => return Ok(SourceCrs::Wgs84),
            Some(crs) => crs,
        };

        match crs.pointer("/properties/name").and_then(|v| v.as_str()) {
            Some(name) => Self::from_name(name),
            None => Err(RiskApiError::UnsupportedCrs {
                crs: crs.to_string(),
            }),
        }
    }
}

fn mercator_to_wgs84(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    Coord { x: lon, y: lat }
}

#[derive(Debug, Clone)]
pub struct RiskZone {
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Option<Rect<f64>>,
}

impl RiskZone {
    pub fn new(name: Option<String>, geometry: MultiPolygon<f64>) -> Self {
        let bbox = geometry.bounding_rect();
        Self {
            name,
            geometry,
            bbox,
        }
    }

    /// 外框快速過濾，含邊界
    pub fn envelope_covers(&self, c: Coord<f64>) -> bool {
        match self.bbox {
            Some(rect) => {
                let (min, max) = (rect.min(), rect.max());
                c.x >= min.x && c.x <= max.x && c.y >= min.y && c.y <= max.y
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiskZoneCollection {
    zones: Vec<RiskZone>,
}

impl RiskZoneCollection {
    pub fn new(zones: Vec<RiskZone>) -> Self {
        Self { zones }
    }

    /// 從 GeoJSON 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_geojson_str(&content)
    }

    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let crs = SourceCrs::detect(&raw)?;
        let geojson = GeoJson::from_json_value(raw)?;

        let mut zones = Vec::new();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in fc.features {
                    let name = feature_name(feature.properties.as_ref());
                    match feature.geometry {
                        Some(geometry) => collect_zones(&geometry, name, &mut zones)?,
                        None => tracing::debug!("Skipping feature without geometry"),
                    }
                }
            }
            GeoJson::Feature(feature) => {
                let name = feature_name(feature.properties.as_ref());
                if let Some(geometry) = feature.geometry {
                    collect_zones(&geometry, name, &mut zones)?;
                }
            }
            GeoJson::Geometry(geometry) => collect_zones(&geometry, None, &mut zones)?,
        }

        if zones.is_empty() {
            return Err(RiskApiError::RiskDataError {
                message: "no Polygon or MultiPolygon geometries found".to_string(),
            });
        }

        if crs == SourceCrs::WebMercator {
            tracing::info!("Reprojecting {} risk zones from Web Mercator to WGS84", zones.len());
            for zone in &mut zones {
                zone.geometry.map_coords_in_place(mercator_to_wgs84);
                zone.bbox = zone.geometry.bounding_rect();
            }
        }

        Ok(Self { zones })
    }

    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn feature_name(properties: Option<&geojson::JsonObject>) -> Option<String> {
    properties
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn collect_zones(geometry: &Geometry, name: Option<String>, out: &mut Vec<RiskZone>) -> Result<()> {
    match &geometry.value {
        Value::Polygon(rings) => {
            let polygon = to_polygon(rings)?;
            out.push(RiskZone::new(name, MultiPolygon::new(vec![polygon])));
        }
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| to_polygon(rings))
                .collect::<Result<Vec<_>>>()?;
            out.push(RiskZone::new(name, MultiPolygon::new(polygons)));
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_zones(member, name.clone(), out)?;
            }
        }
        other => {
            tracing::debug!("Skipping non-polygon geometry: {}", geometry_type(other));
        }
    }
    Ok(())
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            // GeoJSON 位置為 [lon, lat, (alt)]
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(RiskApiError::RiskDataError {
                message: format!("position needs at least 2 values, got {}", pos.len()),
            }),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: &PolygonType) -> Result<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first().ok_or_else(|| RiskApiError::RiskDataError {
        message: "polygon without exterior ring".to_string(),
    })?;

    let interiors = interiors
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(to_ring(exterior)?, interiors))
}

/// 啟動時載入一次的風險資料。載入失敗時服務仍會啟動，但所有分析請求都會失敗。
#[derive(Debug, Clone)]
pub enum RiskZoneStore {
    Ready(RiskZoneCollection),
    Unavailable(String),
}

impl RiskZoneStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match RiskZoneCollection::from_file(path) {
            Ok(collection) => {
                tracing::info!(
                    "✅ Climate risk data loaded: {} zones from {}",
                    collection.len(),
                    path.display()
                );
                RiskZoneStore::Ready(collection)
            }
            Err(e) => {
                tracing::warn!("⚠️ Data file error ({}): {}", path.display(), e);
                tracing::warn!("💡 {}", e.recovery_suggestion());
                RiskZoneStore::Unavailable(e.to_string())
            }
        }
    }

    pub fn collection(&self) -> Option<&RiskZoneCollection> {
        match self {
            RiskZoneStore::Ready(collection) => Some(collection),
            RiskZoneStore::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RiskZoneStore::Ready(_))
    }

    pub fn zone_count(&self) -> usize {
        self.collection().map(RiskZoneCollection::len).unwrap_or(0)
    }
}

impl From<RiskZoneCollection> for RiskZoneStore {
    fn from(collection: RiskZoneCollection) -> Self {
        RiskZoneStore::Ready(collection)
    }
}
