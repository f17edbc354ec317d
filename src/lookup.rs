//! The query facade handed to routing code.

use crate::compute::geometry::QueryGeometry;
use crate::compute::validation::validate_query_geometry;
use crate::config::CompilerConfig;
use crate::error::{Result, SpeedRegionsError};
use crate::files::{CompiledSpeedRulesFile, UncompiledSpeedRulesFile, compile_files};
use crate::rules::{CollapsedRule, EncoderRules, RuleTable, build_lookup_table};
use crate::storage::json;
#[cfg(feature = "snapshot")]
use crate::storage::snapshot;
use crate::tree::{RegionNode, RegionQueryEngine, TreeStats};
use speedregions_types::rule::SpeedRule;
use std::path::PathBuf;

/// Region and rule lookups over a compiled rules file.
///
/// Immutable once built; share it freely between query threads.
#[derive(Debug, Clone)]
pub struct SpeedRegionLookup {
    compiled: CompiledSpeedRulesFile,
    table: RuleTable,
}

impl SpeedRegionLookup {
    /// Validates the tree bounds and rules of `compiled` and builds the rule
    /// table.
    pub fn from_compiled(compiled: CompiledSpeedRulesFile) -> Result<Self> {
        compiled.tree.validate()?;
        let table = build_lookup_table(&compiled.rules)?;
        Ok(Self { compiled, table })
    }

    /// Compiles `files` and builds a lookup over the result.
    pub fn compile(files: &[UncompiledSpeedRulesFile], config: &CompilerConfig) -> Result<Self> {
        Self::from_compiled(compile_files(files, config)?)
    }

    /// Region type for a point or line, or `None` outside every region.
    pub fn region_for(&self, geometry: &QueryGeometry) -> Option<&str> {
        RegionQueryEngine::new(&self.compiled.tree).region_for(geometry)
    }

    /// Like [`region_for`](Self::region_for), but rejects non-finite or
    /// out-of-range coordinates instead of answering `None`.
    pub fn try_region_for(&self, geometry: &QueryGeometry) -> Result<Option<&str>> {
        validate_query_geometry(geometry)?;
        Ok(self.region_for(geometry))
    }

    pub fn region_for_point(&self, lng: f64, lat: f64) -> Option<&str> {
        RegionQueryEngine::new(&self.compiled.tree).region_for_point(lng, lat)
    }

    /// Collapsed rule for an encoder and region type.
    pub fn rule_for(&self, encoder: &str, region_type: &str) -> Option<&CollapsedRule> {
        self.table.rule_for(encoder, region_type)
    }

    /// Rule for an encoder at a geometry's region.
    pub fn rule_at(&self, encoder: &str, geometry: &QueryGeometry) -> Option<&CollapsedRule> {
        let region_type = self.region_for(geometry)?;
        self.rule_for(encoder, region_type)
    }

    /// Rules for one encoder; empty for an unknown encoder.
    pub fn encoder_rules(&self, encoder: &str) -> EncoderRules<'_> {
        self.table.encoder_rules(encoder)
    }

    pub fn tree(&self) -> &RegionNode {
        &self.compiled.tree
    }

    /// Rules as supplied, before collapsing.
    pub fn rules(&self) -> &[SpeedRule] {
        &self.compiled.rules
    }

    pub fn rule_table(&self) -> &RuleTable {
        &self.table
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats::build(&self.compiled.tree)
    }

    pub fn compiled(&self) -> &CompiledSpeedRulesFile {
        &self.compiled
    }

    pub fn into_compiled(self) -> CompiledSpeedRulesFile {
        self.compiled
    }
}

/// Builds a [`SpeedRegionLookup`] from files or in-memory rule sets.
///
/// A binary snapshot takes precedence over a compiled JSON file, which takes
/// precedence over uncompiled input.
///
/// # Examples
///
/// ```
/// use speedregions::{CompilerConfig, LookupBuilder, UncompiledSpeedRulesFile};
/// use speedregions_types::rule::SpeedRule;
///
/// let file = UncompiledSpeedRulesFile {
///     rules: vec![SpeedRule::new().with_multiplier(0.5).matching(["car"], ["x"])],
///     geo_json: None,
/// };
/// let lookup = LookupBuilder::new()
///     .config(CompilerConfig::default().with_min_cell_length_metres(1000.0))
///     .uncompiled(file)
///     .build()
///     .unwrap();
///
/// assert_eq!(lookup.rule_for("car", "x").unwrap().multiplier, 0.5);
/// assert_eq!(lookup.region_for_point(0.0, 0.0), None);
/// ```
#[derive(Debug, Default)]
pub struct LookupBuilder {
    uncompiled: Vec<UncompiledSpeedRulesFile>,
    uncompiled_paths: Vec<PathBuf>,
    compiled_path: Option<PathBuf>,
    #[cfg(feature = "snapshot")]
    snapshot_path: Option<PathBuf>,
    config: CompilerConfig,
}

impl LookupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-memory uncompiled file. Files added first win overlaps.
    pub fn uncompiled(mut self, file: UncompiledSpeedRulesFile) -> Self {
        self.uncompiled.push(file);
        self
    }

    /// Add an uncompiled JSON file, read after in-memory files.
    pub fn uncompiled_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.uncompiled_paths.push(path.into());
        self
    }

    /// Load an already compiled JSON file instead of compiling.
    pub fn compiled_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.compiled_path = Some(path.into());
        self
    }

    /// Load a binary snapshot instead of compiling.
    #[cfg(feature = "snapshot")]
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Compiler settings used for uncompiled input.
    pub fn config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<SpeedRegionLookup> {
        #[cfg(feature = "snapshot")]
        if let Some(path) = self.snapshot_path {
            log::info!("Loading compiled speed regions snapshot from {}", path.display());
            return SpeedRegionLookup::from_compiled(snapshot::load(&path)?);
        }

        if let Some(path) = self.compiled_path {
            log::info!("Loading compiled speed rules from {}", path.display());
            return SpeedRegionLookup::from_compiled(json::load_compiled(&path)?);
        }

        if self.uncompiled.is_empty() && self.uncompiled_paths.is_empty() {
            return Err(SpeedRegionsError::InvalidConfig(
                "No speed rules source was configured".to_string(),
            ));
        }

        let mut files = self.uncompiled;
        for path in &self.uncompiled_paths {
            files.push(json::load_uncompiled(path)?);
        }
        SpeedRegionLookup::compile(&files, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::geojson::region_polygon_feature;
    use geo::{line_string, polygon};
    use geojson::FeatureCollection;

    fn malta_box_file() -> UncompiledSpeedRulesFile {
        let polygon = polygon![
            (x: 14.1, y: 35.8),
            (x: 14.6, y: 35.8),
            (x: 14.6, y: 36.1),
            (x: 14.1, y: 36.1),
        ];
        UncompiledSpeedRulesFile::new(
            vec![
                SpeedRule::new()
                    .with_id("malta")
                    .with_speed("motorway", 80.0)
                    .with_multiplier(0.9)
                    .matching(["car"], ["malta"]),
            ],
            FeatureCollection {
                bbox: None,
                features: vec![region_polygon_feature(&polygon, "Malta")],
                foreign_members: None,
            },
        )
    }

    #[test]
    fn test_builder_requires_source() {
        assert!(matches!(
            LookupBuilder::new().build(),
            Err(SpeedRegionsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lookup_region_and_rule() {
        let lookup = LookupBuilder::new()
            .config(CompilerConfig::default().with_min_cell_length_metres(2000.0))
            .uncompiled(malta_box_file())
            .build()
            .unwrap();

        assert_eq!(lookup.region_for_point(14.35, 35.95), Some("malta"));
        assert_eq!(lookup.region_for_point(2.35, 48.85), None);

        let at = lookup.rule_at("CAR", &(14.35, 35.95).into()).unwrap();
        assert_eq!(at.apply_rule(Some("motorway"), 100.0, false), 80.0);
        assert!(lookup.rule_at("bike", &(14.35, 35.95).into()).is_none());
        assert!(lookup.encoder_rules("bike").is_empty());
        assert_eq!(lookup.stats().region_types, 1);
    }

    #[test]
    fn test_try_region_for_rejects_bad_coordinates() {
        let lookup = SpeedRegionLookup::compile(
            &[malta_box_file()],
            &CompilerConfig::default().with_min_cell_length_metres(2000.0),
        )
        .unwrap();

        assert_eq!(lookup.try_region_for(&(14.35, 35.95).into()).unwrap(), Some("malta"));
        assert_eq!(lookup.try_region_for(&(2.35, 48.85).into()).unwrap(), None);
        assert!(matches!(
            lookup.try_region_for(&(14.35, 95.0).into()),
            Err(SpeedRegionsError::InvalidInput(_))
        ));
        let road = geo::line_string![(x: 14.3, y: 35.9), (x: f64::NAN, y: 35.9)];
        assert!(lookup.try_region_for(&road.into()).is_err());
    }

    #[test]
    fn test_from_compiled_rejects_inverted_bounds() {
        let json = r#"{
            "rules": [],
            "tree": {
                "bounds": {"minLng": 10.0, "maxLng": -10.0, "minLat": 0.0, "maxLat": 1.0},
                "regionType": "x",
                "assignedPriority": 1,
                "children": []
            }
        }"#;
        let compiled: CompiledSpeedRulesFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            SpeedRegionLookup::from_compiled(compiled),
            Err(SpeedRegionsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_compiled_revalidates_rules() {
        let compiled = CompiledSpeedRulesFile {
            rules: vec![
                SpeedRule::new().matching(["car"], ["x"]),
                SpeedRule::new().matching(["car"], ["X"]),
            ],
            tree: RegionNode::new(speedregions_types::bounds::Bounds::global()),
        };
        assert!(matches!(
            SpeedRegionLookup::from_compiled(compiled),
            Err(SpeedRegionsError::DuplicateRuleBinding { .. })
        ));
    }
}
