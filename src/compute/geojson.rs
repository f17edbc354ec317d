//! GeoJSON conversion for region polygons and compiled trees.

use crate::compute::geometry::bounds_polygon;
use crate::compute::validation::validate_polygon;
use crate::error::{Result, SpeedRegionsError};
use crate::text::{REGION_TYPE_KEY, find_region_type, std_string};
use crate::tree::RegionNode;
use geo::{Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

/// Polygonal geometry of one input feature.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Simple(Polygon),
    Multi(Vec<Polygon>),
}

impl RegionGeometry {
    /// Member polygons in source order.
    pub fn into_polygons(self) -> Vec<Polygon> {
        match self {
            RegionGeometry::Simple(polygon) => vec![polygon],
            RegionGeometry::Multi(polygons) => polygons,
        }
    }
}

/// A validated input feature: standardised region type plus its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub region_type: String,
    pub geometry: RegionGeometry,
}

fn ring_from_positions(positions: &[Vec<f64>]) -> std::result::Result<LineString, String> {
    if positions.len() < 3 {
        return Err(format!(
            "ring must have at least 3 positions, got {}",
            positions.len()
        ));
    }

    let coords = positions
        .iter()
        .map(|position| {
            if position.len() < 2 {
                return Err("coordinate must have at least 2 values".to_string());
            }
            Ok(Coord {
                x: position[0],
                y: position[1],
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(LineString::from(coords))
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> std::result::Result<Polygon, String> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err("polygon has no coordinate rings".to_string());
    };

    let exterior = ring_from_positions(exterior).map_err(|e| format!("exterior {}", e))?;
    let interiors = interiors
        .iter()
        .enumerate()
        .map(|(idx, ring)| {
            ring_from_positions(ring).map_err(|e| format!("interior {} {}", idx, e))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let polygon = Polygon::new(exterior, interiors);
    validate_polygon(&polygon).map_err(|e| e.to_string())?;
    Ok(polygon)
}

fn geometry_name(value: &Value) -> &'static str {
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

fn region_geometry(geometry: Option<&Geometry>) -> std::result::Result<RegionGeometry, String> {
    let Some(geometry) = geometry else {
        return Err("feature has no geometry".to_string());
    };

    match &geometry.value {
        Value::Polygon(rings) => Ok(RegionGeometry::Simple(polygon_from_rings(rings)?)),
        Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err("multipolygon has no member polygons".to_string());
            }
            let polygons = polygons
                .iter()
                .enumerate()
                .map(|(idx, rings)| {
                    polygon_from_rings(rings).map_err(|e| format!("member polygon {}: {}", idx, e))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(RegionGeometry::Multi(polygons))
        }
        other => Err(format!(
            "geometry must be a Polygon or MultiPolygon, found {}",
            geometry_name(other)
        )),
    }
}

/// Validates one feature and extracts its region type and polygons.
///
/// `collection` and `feature` are the positions reported in errors.
pub fn region_feature(collection: usize, feature: usize, value: &Feature) -> Result<RegionFeature> {
    let region_type = find_region_type(value.properties.as_ref())
        .map(|r| std_string(&r))
        .ok_or_else(|| {
            SpeedRegionsError::invalid_feature(
                collection,
                feature,
                format!("missing {} property", REGION_TYPE_KEY),
            )
        })?;

    if region_type.is_empty() {
        return Err(SpeedRegionsError::invalid_feature(
            collection,
            feature,
            format!("empty {} property", REGION_TYPE_KEY),
        ));
    }

    let geometry = region_geometry(value.geometry.as_ref())
        .map_err(|reason| SpeedRegionsError::invalid_feature(collection, feature, reason))?;

    Ok(RegionFeature {
        region_type,
        geometry,
    })
}

/// Converts a polygon into a GeoJSON polygon value.
pub fn polygon_value(polygon: &Polygon) -> Value {
    let ring = |line: &LineString| -> Vec<Vec<f64>> {
        line.coords().map(|coord| vec![coord.x, coord.y]).collect()
    };

    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    Value::Polygon(rings)
}

/// Wraps a polygon as a feature carrying a `regiontype` property.
pub fn region_polygon_feature(polygon: &Polygon, region_type: &str) -> Feature {
    let mut properties = Map::new();
    properties.insert(
        REGION_TYPE_KEY.to_string(),
        JsonValue::String(region_type.to_string()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(polygon_value(polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn node_feature(node: &RegionNode) -> Feature {
    let mut properties = Map::new();
    properties.insert(
        REGION_TYPE_KEY.to_string(),
        node.region_type
            .as_ref()
            .map_or(JsonValue::Null, |r| JsonValue::String(r.clone())),
    );
    properties.insert(
        "priority".to_string(),
        JsonValue::from(node.assigned_priority),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(polygon_value(&bounds_polygon(&node.bounds)))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Exports a compiled tree as rectangles, depth first.
///
/// With `leaves_only` set, internal nodes are skipped.
pub fn tree_to_feature_collection(tree: &RegionNode, leaves_only: bool) -> FeatureCollection {
    let mut features = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        if !leaves_only || node.is_leaf() {
            features.push(node_feature(node));
        }
        stack.extend(node.children.iter().rev());
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
