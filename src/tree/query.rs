//! Region lookup against a compiled tree.

use super::RegionNode;
use crate::compute::geometry::QueryGeometry;
use speedregions_types::bounds::Bounds;

/// Answers region queries against a finished tree.
///
/// When a geometry touches several claimed leaves the leaf with the lowest
/// priority rank wins; ties go to the first leaf in child order.
#[derive(Debug, Clone, Copy)]
pub struct RegionQueryEngine<'a> {
    tree: &'a RegionNode,
}

impl<'a> RegionQueryEngine<'a> {
    pub fn new(tree: &'a RegionNode) -> Self {
        Self { tree }
    }

    /// Region type of the winning leaf, or `None` outside every region.
    pub fn region_for(&self, geometry: &QueryGeometry) -> Option<&'a str> {
        self.find_leaf(geometry)
            .and_then(|leaf| leaf.region_type.as_deref())
    }

    pub fn region_for_point(&self, lng: f64, lat: f64) -> Option<&'a str> {
        self.region_for(&QueryGeometry::from((lng, lat)))
    }

    /// The winning assigned leaf for `geometry`.
    pub fn find_leaf(&self, geometry: &QueryGeometry) -> Option<&'a RegionNode> {
        let envelope = geometry.bounds()?;
        let mut best = None;
        Self::descend(self.tree, geometry, &envelope, &mut best);
        best
    }

    fn descend(
        node: &'a RegionNode,
        geometry: &QueryGeometry,
        envelope: &Bounds,
        best: &mut Option<&'a RegionNode>,
    ) {
        if !node.bounds.intersects(envelope) {
            return;
        }

        if node.is_assigned() {
            let better = best.is_none_or(|b| node.assigned_priority < b.assigned_priority);
            if better && geometry.intersects_bounds(&node.bounds) {
                *best = Some(node);
            }
            return;
        }

        for child in &node.children {
            // Siblings are sorted by priority, so nothing later can win
            if best.is_some_and(|b| child.assigned_priority >= b.assigned_priority) {
                break;
            }
            Self::descend(child, geometry, envelope, best);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn leaf(bounds: Bounds, region: &str, priority: i64) -> RegionNode {
        RegionNode {
            bounds,
            region_type: Some(region.to_string()),
            assigned_priority: priority,
            children: Vec::new(),
        }
    }

    /// West half "b" (priority 2), east half "a" (priority 1).
    fn two_leaf_tree() -> RegionNode {
        RegionNode {
            bounds: Bounds::new(0.0, 2.0, 0.0, 1.0),
            region_type: None,
            assigned_priority: 1,
            children: vec![
                leaf(Bounds::new(1.0, 2.0, 0.0, 1.0), "a", 1),
                leaf(Bounds::new(0.0, 1.0, 0.0, 1.0), "b", 2),
            ],
        }
    }

    #[test]
    fn test_point_queries() {
        let tree = two_leaf_tree();
        let engine = RegionQueryEngine::new(&tree);

        assert_eq!(engine.region_for_point(0.5, 0.5), Some("b"));
        assert_eq!(engine.region_for_point(1.5, 0.5), Some("a"));
        assert_eq!(engine.region_for_point(3.0, 0.5), None);
    }

    #[test]
    fn test_shared_edge_resolves_to_lowest_priority() {
        let tree = two_leaf_tree();
        let engine = RegionQueryEngine::new(&tree);
        assert_eq!(engine.region_for_point(1.0, 0.5), Some("a"));
    }

    #[test]
    fn test_line_spanning_leaves() {
        let tree = two_leaf_tree();
        let engine = RegionQueryEngine::new(&tree);

        let spanning = line_string![(x: 0.2, y: 0.5), (x: 1.8, y: 0.5)];
        assert_eq!(engine.region_for(&spanning.into()), Some("a"));

        let west_only = line_string![(x: 0.2, y: 0.2), (x: 0.8, y: 0.8)];
        assert_eq!(engine.region_for(&west_only.into()), Some("b"));

        let outside = line_string![(x: 5.0, y: 5.0), (x: 6.0, y: 6.0)];
        assert_eq!(engine.region_for(&outside.into()), None);
    }

    #[test]
    fn test_unassigned_tree() {
        let tree = RegionNode::new(Bounds::global());
        assert_eq!(RegionQueryEngine::new(&tree).region_for_point(0.0, 0.0), None);
    }
}
