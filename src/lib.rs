//! Speed regions for routing preprocessing.
//!
//! Compiles prioritised, possibly overlapping region polygons into a
//! quadtree, resolves inherited per-road-type speed rules and answers
//! "which region is this road in, and what speed applies" queries.
//!
//! ```rust
//! use geo::polygon;
//! use speedregions::prelude::*;
//! use speedregions::compute::geojson::region_polygon_feature;
//!
//! let valletta = polygon![
//!     (x: 14.49, y: 35.88), (x: 14.53, y: 35.88), (x: 14.53, y: 35.91), (x: 14.49, y: 35.91),
//! ];
//! let file = UncompiledSpeedRulesFile::new(
//!     vec![SpeedRule::new().with_multiplier(0.6).matching(["car"], ["valletta"])],
//!     geojson::FeatureCollection {
//!         bbox: None,
//!         features: vec![region_polygon_feature(&valletta, "Valletta")],
//!         foreign_members: None,
//!     },
//! );
//!
//! let config = CompilerConfig::default().with_min_cell_length_metres(500.0);
//! let lookup = SpeedRegionLookup::compile(&[file], &config)?;
//!
//! let region = lookup.region_for_point(14.51, 35.895);
//! assert_eq!(region, Some("valletta"));
//! let rule = lookup.rule_for("car", "valletta").unwrap();
//! assert_eq!(rule.apply_rule(Some("primary"), 50.0, false), 30.0);
//! # Ok::<(), speedregions::SpeedRegionsError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod files;
pub mod lookup;
pub mod rules;
pub mod storage;
pub mod text;
pub mod tree;

pub use config::CompilerConfig;
pub use error::{Result, SpeedRegionsError};
pub use files::{CompiledSpeedRulesFile, UncompiledSpeedRulesFile, compile_files};
pub use lookup::{LookupBuilder, SpeedRegionLookup};

pub use compute::geometry::QueryGeometry;
pub use rules::{CollapsedRule, EncoderRules, RuleTable};
pub use tree::{RegionNode, TreeStats};

pub use speedregions_types::bounds::Bounds;
pub use speedregions_types::rule::{MatchRule, SpeedRule};
pub use speedregions_types::unit::SpeedUnit;

pub use geo::{LineString, Point, Polygon};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{LookupBuilder, Result, SpeedRegionLookup, SpeedRegionsError};

    pub use crate::{CompiledSpeedRulesFile, CompilerConfig, UncompiledSpeedRulesFile};

    pub use crate::{CollapsedRule, QueryGeometry, RegionNode};

    pub use crate::{Bounds, MatchRule, SpeedRule, SpeedUnit};

    pub use geo::{LineString, Point, Polygon};
}
