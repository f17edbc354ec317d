//! The compiled region quadtree.
//!
//! [`QuadtreeCompiler`] turns a prioritised polygon sequence into a
//! [`RegionNode`] tree, which is immutable once returned and answers
//! region queries through [`RegionQueryEngine`].

pub mod builder;
pub mod query;
pub mod queue;
pub mod stats;

pub use builder::QuadtreeCompiler;
pub use query::RegionQueryEngine;
pub use queue::{InputPolygon, PriorityPolygonQueue};
pub use stats::TreeStats;

use crate::error::{Result, SpeedRegionsError};
use serde::{Deserialize, Serialize};
use speedregions_types::bounds::Bounds;

/// Priority of a node with no assigned descendant.
pub const UNASSIGNED_PRIORITY: i64 = i64::MAX;

/// One node of a compiled region tree.
///
/// An assigned node (`region_type` set) has no children. Internal nodes
/// carry the minimum priority of their descendants and keep their children
/// sorted by ascending priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNode {
    pub bounds: Bounds,
    pub region_type: Option<String>,
    pub assigned_priority: i64,
    pub children: Vec<RegionNode>,
}

impl RegionNode {
    /// An empty node covering `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            region_type: None,
            assigned_priority: UNASSIGNED_PRIORITY,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_assigned(&self) -> bool {
        self.region_type.is_some()
    }

    /// Checks that every node's bounds are finite and ordered.
    ///
    /// Compiled trees always pass; this guards trees read back from disk.
    pub fn validate(&self) -> Result<()> {
        if !self.bounds.is_valid() {
            return Err(SpeedRegionsError::InvalidInput(format!(
                "Tree node has invalid bounds: {:?}",
                self.bounds
            )));
        }
        self.children.iter().try_for_each(RegionNode::validate)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(RegionNode::count_nodes).sum::<usize>()
    }

    /// Visits every leaf in child order.
    pub fn visit_leaves<'a>(&'a self, f: &mut impl FnMut(&'a RegionNode)) {
        if self.is_leaf() {
            f(self);
        } else {
            for child in &self.children {
                child.visit_leaves(f);
            }
        }
    }
}
