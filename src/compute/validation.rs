//! Validation for geographic coordinates.

use crate::compute::geometry::QueryGeometry;
use crate::error::{Result, SpeedRegionsError};
use geo::{Coord, Polygon};

/// Validates a longitude/latitude pair.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use speedregions::compute::validation::validate_lng_lat;
///
/// assert!(validate_lng_lat(14.51, 35.89).is_ok());
/// assert!(validate_lng_lat(200.0, 35.89).is_err());
/// assert!(validate_lng_lat(14.51, f64::NAN).is_err());
/// ```
pub fn validate_lng_lat(lng: f64, lat: f64) -> Result<()> {
    if !lng.is_finite() {
        return Err(SpeedRegionsError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lng
        )));
    }

    if !lat.is_finite() {
        return Err(SpeedRegionsError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lng) {
        return Err(SpeedRegionsError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lng
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(SpeedRegionsError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    Ok(())
}

fn validate_coord(coord: &Coord) -> Result<()> {
    validate_lng_lat(coord.x, coord.y)
}

/// Validates all polygon coordinates (exterior and interior rings).
pub fn validate_polygon(polygon: &Polygon) -> Result<()> {
    if polygon.exterior().0.is_empty() {
        return Err(SpeedRegionsError::InvalidInput(
            "Polygon has an empty exterior ring".to_string(),
        ));
    }

    for (idx, coord) in polygon.exterior().coords().enumerate() {
        validate_coord(coord).map_err(|e| {
            SpeedRegionsError::InvalidInput(format!("Exterior ring point at index {}: {}", idx, e))
        })?;
    }

    for (ring_idx, interior) in polygon.interiors().iter().enumerate() {
        for (idx, coord) in interior.coords().enumerate() {
            validate_coord(coord).map_err(|e| {
                SpeedRegionsError::InvalidInput(format!(
                    "Interior ring {} point at index {}: {}",
                    ring_idx, idx, e
                ))
            })?;
        }
    }

    Ok(())
}

/// Validates a query point or line.
pub fn validate_query_geometry(geometry: &QueryGeometry) -> Result<()> {
    match geometry {
        QueryGeometry::Point(p) => validate_lng_lat(p.x(), p.y()),
        QueryGeometry::Line(line) => {
            for (idx, coord) in line.coords().enumerate() {
                validate_coord(coord).map_err(|e| {
                    SpeedRegionsError::InvalidInput(format!("Line point at index {}: {}", idx, e))
                })?;
            }
            Ok(())
        }
    }
}
