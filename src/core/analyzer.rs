use crate::core::risk_zones::{RiskZone, RiskZoneCollection};
use crate::domain::model::Coordinate;
use geo::{Contains, Coord, Intersects, Point};
use serde::{Deserialize, Serialize};

/// 點剛好落在多邊形邊上時如何判定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryRule {
    /// Edge and vertex points are outside the zone.
    #[default]
    Exclusive,
    /// Edge and vertex points are inside the zone.
    Inclusive,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAnalyzer {
    boundary: BoundaryRule,
}

impl RiskAnalyzer {
    pub fn new(boundary: BoundaryRule) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> BoundaryRule {
        self.boundary
    }

    pub fn is_at_risk(&self, zones: &RiskZoneCollection, coordinate: Coordinate) -> bool {
        self.matching_zone(zones, coordinate).is_some()
    }

    /// 第一個包含該座標的風險區域
    pub fn matching_zone<'a>(
        &self,
        zones: &'a RiskZoneCollection,
        coordinate: Coordinate,
    ) -> Option<&'a RiskZone> {
        let coord = Coord {
            x: coordinate.lon,
            y: coordinate.lat,
        };
        let point = Point::from(coord);

        zones
            .zones()
            .iter()
            .filter(|zone| zone.envelope_covers(coord))
            .find(|zone| match self.boundary {
                BoundaryRule::Exclusive => zone.geometry.contains(&point),
                BoundaryRule::Inclusive => zone.geometry.intersects(&point),
            })
    }
}
