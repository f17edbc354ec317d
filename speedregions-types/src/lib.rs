//! # speedregions-types
//!
//! Core value types shared by the speedregions compiler and its persisted artifacts.
//!
//! - **Bounds**: `Bounds`, an axis-aligned longitude/latitude rectangle with
//!   great-circle width/height and quadrant splits
//! - **Units**: `SpeedUnit` with km/h <-> mph conversion
//! - **Rules**: `SpeedRule` and `MatchRule`, the raw speed-rule records
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use speedregions_types::bounds::Bounds;
//! use speedregions_types::unit::SpeedUnit;
//!
//! let malta = Bounds::new(14.18, 14.58, 35.78, 36.09);
//! assert!(malta.width_metres() > 30_000.0);
//!
//! let kmh = SpeedUnit::convert(60.0, SpeedUnit::MilesPerHour, SpeedUnit::KmPerHour);
//! assert!((kmh - 96.5604).abs() < 1e-6);
//! ```

pub mod bounds;
pub mod rule;
pub mod unit;
