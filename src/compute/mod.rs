//! Geometry, validation and GeoJSON conversion used by the compiler and
//! the query engine.
//!
//! Nothing here holds state; the tree and rule modules build on it.

pub mod geojson;
pub mod geometry;
pub mod validation;
