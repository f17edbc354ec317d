//! The on-disk rule file formats.
//!
//! An uncompiled file pairs speed rules with the GeoJSON regions they refer
//! to. A compiled file replaces the GeoJSON with the finished quadtree, so
//! loading it needs no geometry work.

use crate::config::CompilerConfig;
use crate::error::Result;
use crate::rules;
use crate::tree::{PriorityPolygonQueue, QuadtreeCompiler, RegionNode, TreeStats};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use speedregions_types::rule::SpeedRule;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UncompiledSpeedRulesFile {
    pub rules: Vec<SpeedRule>,
    pub geo_json: Option<FeatureCollection>,
}

impl UncompiledSpeedRulesFile {
    pub fn new(rules: Vec<SpeedRule>, geo_json: FeatureCollection) -> Self {
        Self {
            rules,
            geo_json: Some(geo_json),
        }
    }
}

/// Validated rules plus the compiled region tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledSpeedRulesFile {
    /// Rules as supplied, before collapsing
    pub rules: Vec<SpeedRule>,
    pub tree: RegionNode,
}

/// Compiles uncompiled files into one compiled file.
///
/// Files are prioritised in the order given: a region in an earlier file
/// wins wherever it overlaps a region in a later one. Rules are validated
/// before any geometry is processed. Feature errors name the position of
/// the offending file in `files`.
pub fn compile_files(
    files: &[UncompiledSpeedRulesFile],
    config: &CompilerConfig,
) -> Result<CompiledSpeedRulesFile> {
    let rules: Vec<SpeedRule> = files.iter().flat_map(|f| f.rules.iter().cloned()).collect();
    rules::validate(&rules)?;

    let mut queue = PriorityPolygonQueue::new();
    for (index, file) in files.iter().enumerate() {
        if let Some(collection) = &file.geo_json {
            queue.push_collection_at(index, collection)?;
        }
    }
    let tree = QuadtreeCompiler::compile(&queue, config)?;
    log::info!("Built region quadtree: {}", TreeStats::build(&tree));

    Ok(CompiledSpeedRulesFile { rules, tree })
}
