//! Geometry helpers over the `geo` crate used by the compiler and the query engine.

use geo::{
    Area, BooleanOps, BoundingRect, Contains, Intersects, LineString, MultiPolygon, Point,
    Polygon,
};
use speedregions_types::bounds::Bounds;

/// Rectangle of `bounds` as a polygon.
pub fn bounds_polygon(bounds: &Bounds) -> Polygon {
    bounds.to_rect().to_polygon()
}

/// Bounding rectangle of a polygon, or `None` for an empty polygon.
pub fn polygon_bounds(polygon: &Polygon) -> Option<Bounds> {
    polygon.bounding_rect().map(Bounds::from)
}

/// Clip `polygon` to `rect`, returning its simple polygon fragments.
///
/// The boolean overlay also normalises ring orientation and resolves
/// self-touching rings, so fragments are always valid simple polygons.
pub fn clip(polygon: &Polygon, rect: &Polygon) -> MultiPolygon {
    polygon.intersection(rect)
}

/// Whether `polygon` covers the whole of `rect`.
pub fn covers(polygon: &Polygon, rect: &Polygon) -> bool {
    polygon.contains(rect)
}

/// Whether `polygon` shares area with the rectangle `bounds`.
///
/// Touching along an edge or at a corner does not count.
pub fn overlaps_interior(polygon: &Polygon, bounds: &Bounds) -> bool {
    let rect = bounds.to_rect();
    if !polygon.intersects(&rect) {
        return false;
    }

    match polygon_bounds(polygon) {
        Some(env)
            if env.min_lng > bounds.min_lng
                && env.max_lng < bounds.max_lng
                && env.min_lat > bounds.min_lat
                && env.max_lat < bounds.max_lat =>
        {
            polygon.unsigned_area() > 0.0
        }
        _ => polygon.intersection(&rect.to_polygon()).unsigned_area() > 0.0,
    }
}

/// Number of coordinates over all rings; used for progress logging.
pub fn vertex_count(polygon: &Polygon) -> usize {
    polygon.exterior().0.len() + polygon.interiors().iter().map(|r| r.0.len()).sum::<usize>()
}

/// Geometry a region can be queried with.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryGeometry {
    Point(Point),
    Line(LineString),
}

impl QueryGeometry {
    /// Bounding rectangle, or `None` for an empty line.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            QueryGeometry::Point(p) => Some(Bounds::new(p.x(), p.x(), p.y(), p.y())),
            QueryGeometry::Line(line) => line.bounding_rect().map(Bounds::from),
        }
    }

    /// Whether the geometry touches the closed rectangle `bounds`.
    pub fn intersects_bounds(&self, bounds: &Bounds) -> bool {
        match self {
            QueryGeometry::Point(p) => bounds.contains_point(p.x(), p.y()),
            QueryGeometry::Line(line) => line.intersects(&bounds.to_rect()),
        }
    }
}

impl From<Point> for QueryGeometry {
    fn from(point: Point) -> Self {
        QueryGeometry::Point(point)
    }
}

impl From<LineString> for QueryGeometry {
    fn from(line: LineString) -> Self {
        QueryGeometry::Line(line)
    }
}

impl From<(f64, f64)> for QueryGeometry {
    fn from((lng, lat): (f64, f64)) -> Self {
        QueryGeometry::Point(Point::new(lng, lat))
    }
}
