//! Point-in-polygon reverse geocoding over a GeoJSON `FeatureCollection`
//! of country borders (Natural Earth admin-0 style properties).

use crate::domain::ports::{CountryNameResolver, ReverseGeocoder};
use crate::utils::error::{Result, TimelineError};
use geo::{BoundingRect, Coord, Intersects, LineString, MultiPolygon, Polygon, Rect};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const CODE_KEYS: [&str; 4] = ["ISO_A3", "iso_a3", "ADM0_A3", "code"];
const NAME_KEYS: [&str; 4] = ["NAME", "name", "ADMIN", "NAME_LONG"];
/// Natural Earth's placeholder for "no ISO code".
const NO_CODE: &str = "-99";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: Option<Geometry>,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// `(lng, lat)` rings; the first ring is the outline, the rest are holes.
fn polygon_from_rings(rings: Vec<Vec<Position>>) -> Option<Polygon<f64>> {
    let mut rings = rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter(|position| position.len() >= 2)
                .map(|position| (position[0], position[1]))
                .collect::<Vec<_>>()
        })
        .filter(|ring| ring.len() >= 3)
        .map(LineString::<f64>::from);
    let outline = rings.next()?;
    Some(Polygon::new(outline, rings.collect()))
}

#[derive(Debug, Clone)]
struct CountryShape {
    code: String,
    bbox: Rect<f64>,
    area: MultiPolygon<f64>,
}

/// Country borders indexed for lookups. Features are kept in file order, so
/// overlapping territories listed later are reported later.
#[derive(Debug, Clone, Default)]
pub struct BoundaryIndex {
    shapes: Vec<CountryShape>,
    names: HashMap<String, String>,
}

impl BoundaryIndex {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_slice(bytes).map_err(|e| TimelineError::GeocoderError {
                message: format!("boundaries are not a GeoJSON FeatureCollection: {}", e),
            })?;

        let mut index = Self::default();
        let mut skipped = 0usize;
        for feature in collection.features {
            let Some(code) = first_string(&feature.properties, &CODE_KEYS) else {
                skipped += 1;
                continue;
            };
            if let Some(name) = first_string(&feature.properties, &NAME_KEYS) {
                index.names.entry(code.clone()).or_insert(name);
            }

            let polygons: Vec<Polygon<f64>> = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    polygon_from_rings(coordinates).into_iter().collect()
                }
                Some(Geometry::MultiPolygon { coordinates }) => coordinates
                    .into_iter()
                    .filter_map(polygon_from_rings)
                    .collect(),
                Some(Geometry::Unsupported) | None => Vec::new(),
            };
            let area = MultiPolygon::new(polygons);
            let Some(bbox) = area.bounding_rect() else {
                skipped += 1;
                continue;
            };

            index.shapes.push(CountryShape { code, bbox, area });
        }

        tracing::info!(
            "🗺️ Loaded {} country boundaries ({} features skipped)",
            index.shapes.len(),
            skipped
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn first_string(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty() && *value != NO_CODE)
        .map(str::to_string)
}

impl ReverseGeocoder for BoundaryIndex {
    fn lookup(&self, lat: f64, lng: f64) -> Result<Vec<String>> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(TimelineError::GeocoderError {
                message: format!("cannot look up ({}, {})", lat, lng),
            });
        }

        // 邊界上的點屬於每個相鄰的國家
        let point = Coord { x: lng, y: lat };
        Ok(self
            .shapes
            .iter()
            .filter(|shape| shape.bbox.intersects(&point))
            .filter(|shape| shape.area.intersects(&point))
            .map(|shape| shape.code.clone())
            .collect())
    }
}

impl CountryNameResolver for BoundaryIndex {
    fn resolve(&self, code: &str) -> Option<String> {
        self.names.get(code).cloned()
    }
}
