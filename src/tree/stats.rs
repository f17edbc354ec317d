use super::RegionNode;
use speedregions_types::bounds::Bounds;
use std::collections::BTreeMap;

/// Summary of a compiled tree, used for logging and reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaf_nodes: usize,
    pub region_types: usize,
    /// Union of the bounds of all leaves assigned to each region type.
    pub region_bounds: BTreeMap<String, Bounds>,
}

impl TreeStats {
    pub fn build(tree: &RegionNode) -> Self {
        let mut stats = TreeStats::default();
        stats.visit(tree);
        stats.region_types = stats.region_bounds.len();
        stats
    }

    fn visit(&mut self, node: &RegionNode) {
        self.nodes += 1;
        if node.is_leaf() {
            self.leaf_nodes += 1;
        }

        if let Some(region) = &node.region_type {
            self.region_bounds
                .entry(region.clone())
                .and_modify(|b| b.expand_to_include(&node.bounds))
                .or_insert(node.bounds);
        }

        for child in &node.children {
            self.visit(child);
        }
    }
}

impl std::fmt::Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, {} region types",
            self.nodes, self.leaf_nodes, self.region_types
        )
    }
}
