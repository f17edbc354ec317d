//! Adaptive quadtree compiler.
//!
//! Polygons are inserted one at a time in priority order. Each insertion
//! walks down from the root, clipping the polygon to every cell it visits,
//! and claims a cell once the clipped fragment covers it or the cell has
//! reached the minimum size. A claimed cell is never reassigned, which is
//! what gives earlier polygons precedence over later ones.
//!
//! Cells are split in two along whichever axis keeps them within the
//! minimum side length and aspect ratio, preferring the axis whose halves
//! separate the fragment cleanly. Siblings that end up claimed by the same
//! region are merged back into their parent.
//!
//! During compilation nodes live in an arena together with their cached
//! rectangle geometry. [`QuadtreeCompiler::finish`] prunes unclaimed cells,
//! sorts siblings by priority, drops single-child levels and returns a plain
//! [`RegionNode`] tree.

use super::{InputPolygon, RegionNode, UNASSIGNED_PRIORITY};
use crate::compute::geometry::{
    bounds_polygon, clip, covers, overlaps_interior, polygon_bounds, vertex_count,
};
use crate::compute::validation::validate_polygon;
use crate::config::CompilerConfig;
use crate::error::{Result, SpeedRegionsError};
use geo::Polygon;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use speedregions_types::bounds::Bounds;
use std::time::Instant;

/// Fraction by which a cell is enlarged before clipping, so polygon edges
/// lying on a cell edge still cover it.
const INTERSECTION_SAFETY_FRACTION: f64 = 0.01;
const MIN_SIDES_RATIO: f64 = 0.25;
const SIDES_RATIO_TOLERANCE: f64 = 1e-4;

type NodeId = usize;
const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitAxis {
    /// Along a line of constant latitude
    Horizontal,
    /// Along a line of constant longitude
    Vertical,
}

struct BuilderNode {
    bounds: Bounds,
    rect: Polygon,
    region: Option<u32>,
    priority: i64,
    children: SmallVec<[NodeId; 4]>,
}

impl BuilderNode {
    fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            rect: bounds_polygon(&bounds),
            region: None,
            priority: UNASSIGNED_PRIORITY,
            children: SmallVec::new(),
        }
    }
}

/// Builds a [`RegionNode`] tree from prioritised polygons.
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use speedregions::config::CompilerConfig;
/// use speedregions::tree::{PriorityPolygonQueue, QuadtreeCompiler, RegionQueryEngine};
///
/// let mut queue = PriorityPolygonQueue::new();
/// queue.push(
///     polygon![(x: 14.0, y: 35.0), (x: 15.0, y: 35.0), (x: 15.0, y: 36.0), (x: 14.0, y: 36.0)],
///     "Malta",
/// );
///
/// let config = CompilerConfig::default().with_min_cell_length_metres(5000.0);
/// let tree = QuadtreeCompiler::compile(&queue, &config).unwrap();
///
/// let engine = RegionQueryEngine::new(&tree);
/// assert_eq!(engine.region_for(&(14.5, 35.5).into()), Some("malta"));
/// assert_eq!(engine.region_for(&(0.0, 0.0).into()), None);
/// ```
pub struct QuadtreeCompiler {
    min_cell_length_metres: f64,
    nodes: Vec<BuilderNode>,
    free: Vec<NodeId>,
    live_nodes: usize,
    region_types: Vec<String>,
    region_ids: FxHashMap<String, u32>,
}

impl QuadtreeCompiler {
    /// Compiles `polygons` into a finished tree.
    ///
    /// Polygons are inserted in ascending `priority_rank` regardless of the
    /// order they are supplied in.
    pub fn compile<'a, I>(polygons: I, config: &CompilerConfig) -> Result<RegionNode>
    where
        I: IntoIterator<Item = &'a InputPolygon>,
    {
        let mut ordered: Vec<&InputPolygon> = polygons.into_iter().collect();
        ordered.sort_by_key(|p| p.priority_rank);

        let start = Instant::now();
        log::info!(
            "Starting build of region quadtree from {} polygons, minimum cell length {}m",
            ordered.len(),
            config.min_cell_length_metres
        );

        let mut compiler = Self::new(config)?;
        let total = ordered.len();
        for (i, polygon) in ordered.into_iter().enumerate() {
            log::debug!(
                "Adding polygon {}/{} ({}) containing {} points to tree with {} node(s)",
                i + 1,
                total,
                polygon.region_type,
                vertex_count(&polygon.polygon),
                compiler.node_count()
            );
            compiler.insert(polygon)?;
        }

        let tree = compiler.finish();
        log::info!(
            "Finished building region quadtree: {} nodes in {:.2?}",
            tree.count_nodes(),
            start.elapsed()
        );
        Ok(tree)
    }

    /// Creates a compiler holding the whole globe, pre-split into quadrants.
    pub fn new(config: &CompilerConfig) -> Result<Self> {
        config.validate().map_err(SpeedRegionsError::InvalidConfig)?;

        let mut compiler = Self {
            min_cell_length_metres: config.min_cell_length_metres,
            nodes: vec![BuilderNode::new(Bounds::global())],
            free: Vec::new(),
            live_nodes: 1,
            region_types: Vec::new(),
            region_ids: FxHashMap::default(),
        };

        // Great-circle lengths are meaningless across a whole hemisphere
        let mut open = vec![ROOT];
        for axis in [SplitAxis::Horizontal, SplitAxis::Vertical] {
            let mut next = Vec::with_capacity(open.len() * 2);
            for node in open {
                next.extend(compiler.split_on(node, axis));
            }
            open = next;
        }

        Ok(compiler)
    }

    /// Number of nodes currently reachable from the root.
    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    /// Inserts one polygon. Callers must insert in ascending priority rank.
    pub fn insert(&mut self, polygon: &InputPolygon) -> Result<()> {
        let priority = i64::try_from(polygon.priority_rank)
            .ok()
            .filter(|p| *p < UNASSIGNED_PRIORITY)
            .ok_or_else(|| {
                SpeedRegionsError::InvalidInput(format!(
                    "Priority rank out of range: {}",
                    polygon.priority_rank
                ))
            })?;

        validate_polygon(&polygon.polygon)?;
        let Some(envelope) = polygon_bounds(&polygon.polygon) else {
            log::debug!("Skipping empty polygon for region {}", polygon.region_type);
            return Ok(());
        };

        let region = self.intern(&polygon.region_type);
        self.add_recursively(ROOT, 0, &polygon.polygon, &envelope, region, priority)
    }

    /// Finalises the tree.
    ///
    /// Unclaimed cells are pruned, siblings are sorted by ascending priority
    /// and a node left with a single child is replaced by that child. If no
    /// cell was claimed the result is an empty global root.
    pub fn finish(self) -> RegionNode {
        self.finalize(ROOT)
            .unwrap_or_else(|| RegionNode::new(Bounds::global()))
    }

    fn intern(&mut self, region_type: &str) -> u32 {
        if let Some(&id) = self.region_ids.get(region_type) {
            return id;
        }
        let id = self.region_types.len() as u32;
        self.region_types.push(region_type.to_string());
        self.region_ids.insert(region_type.to_string(), id);
        id
    }

    fn push_node(&mut self, bounds: Bounds) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = BuilderNode::new(bounds);
                id
            }
            None => {
                self.nodes.push(BuilderNode::new(bounds));
                self.nodes.len() - 1
            }
        }
    }

    fn split_on(&mut self, node: NodeId, axis: SplitAxis) -> [NodeId; 2] {
        let bounds = self.nodes[node].bounds;
        let halves = match axis {
            SplitAxis::Horizontal => bounds.horizontal_split(),
            SplitAxis::Vertical => bounds.vertical_split(),
        };

        let ids = [self.push_node(halves[0]), self.push_node(halves[1])];
        self.nodes[node].children.extend(ids);
        self.live_nodes += 2;
        ids
    }

    fn can_split(&self, bounds: &Bounds, axis: SplitAxis) -> bool {
        let (halved, other) = match axis {
            SplitAxis::Horizontal => (bounds.height_metres() / 2.0, bounds.width_metres()),
            SplitAxis::Vertical => (bounds.width_metres() / 2.0, bounds.height_metres()),
        };

        halved >= self.min_cell_length_metres
            && halved / other >= MIN_SIDES_RATIO - SIDES_RATIO_TOLERANCE
    }

    fn is_assignable(&self, node: NodeId, fragment: &Polygon) -> bool {
        let n = &self.nodes[node];
        let splittable = self.can_split(&n.bounds, SplitAxis::Horizontal)
            || self.can_split(&n.bounds, SplitAxis::Vertical);

        // contains is the expensive test
        !splittable || covers(fragment, &n.rect)
    }

    /// A split is good when exactly one half overlaps the fragment.
    fn is_good_split(halves: &[Bounds; 2], fragment: &Polygon) -> bool {
        overlaps_interior(fragment, &halves[0]) != overlaps_interior(fragment, &halves[1])
    }

    fn split(&mut self, node: NodeId, depth: usize, fragment: &Polygon) -> Result<()> {
        let bounds = self.nodes[node].bounds;
        let horizontal = self.can_split(&bounds, SplitAxis::Horizontal);
        let vertical = self.can_split(&bounds, SplitAxis::Vertical);

        let axis = match (horizontal, vertical) {
            (false, false) => {
                return Err(SpeedRegionsError::CompilerInvariant(format!(
                    "attempted to split a cell that cannot split on either axis: {:?}",
                    bounds
                )));
            }
            (true, false) => SplitAxis::Horizontal,
            (false, true) => SplitAxis::Vertical,
            (true, true) => {
                let h_good = Self::is_good_split(&bounds.horizontal_split(), fragment);
                let v_good = Self::is_good_split(&bounds.vertical_split(), fragment);
                match (h_good, v_good) {
                    (true, false) => SplitAxis::Horizontal,
                    (false, true) => SplitAxis::Vertical,
                    _ if depth % 2 == 0 => SplitAxis::Horizontal,
                    _ => SplitAxis::Vertical,
                }
            }
        };

        self.split_on(node, axis);
        Ok(())
    }

    fn add_recursively(
        &mut self,
        node: NodeId,
        depth: usize,
        polygon: &Polygon,
        envelope: &Bounds,
        region: u32,
        priority: i64,
    ) -> Result<()> {
        // Claimed by an earlier polygon
        if self.nodes[node].region.is_some() {
            return Ok(());
        }

        let bounds = self.nodes[node].bounds;
        if !envelope.intersects(&bounds) {
            return Ok(());
        }

        // Everything below this node only needs the part of the polygon
        // inside it
        let window = bounds_polygon(&bounds.enlarged(INTERSECTION_SAFETY_FRACTION));
        let fragments = clip(polygon, &window);
        if fragments.0.len() > 1 {
            log::trace!(
                "Clipping to {:?} split polygon into {} fragments",
                bounds,
                fragments.0.len()
            );
        }

        for fragment in fragments.0.iter() {
            if !overlaps_interior(fragment, &bounds) {
                continue;
            }

            if self.nodes[node].children.is_empty() {
                if self.is_assignable(node, fragment) {
                    let n = &mut self.nodes[node];
                    n.region = Some(region);
                    n.priority = priority;
                    return Ok(());
                }
                self.split(node, depth, fragment)?;
            }

            let Some(fragment_envelope) = polygon_bounds(fragment) else {
                continue;
            };
            let children = self.nodes[node].children.clone();
            for child in children {
                self.add_recursively(child, depth + 1, fragment, &fragment_envelope, region, priority)?;
            }

            self.recombine(node);
            if self.nodes[node].region.is_some() {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Merges children into `node` when all are leaves claimed by one region.
    fn recombine(&mut self, node: NodeId) {
        let children = &self.nodes[node].children;
        let Some(&first) = children.first() else {
            return;
        };
        let Some(region) = self.nodes[first].region else {
            return;
        };

        let uniform = children.iter().all(|&c| {
            let child = &self.nodes[c];
            child.children.is_empty() && child.region == Some(region)
        });
        if !uniform {
            return;
        }

        let priority = self.nodes[first].priority;
        let removed = std::mem::take(&mut self.nodes[node].children);
        self.live_nodes -= removed.len();
        self.free.extend(removed);

        let n = &mut self.nodes[node];
        n.region = Some(region);
        n.priority = priority;
    }

    fn finalize(&self, id: NodeId) -> Option<RegionNode> {
        let node = &self.nodes[id];
        if let Some(region) = node.region {
            return Some(RegionNode {
                bounds: node.bounds,
                region_type: Some(self.region_types[region as usize].clone()),
                assigned_priority: node.priority,
                children: Vec::new(),
            });
        }

        let mut children: Vec<RegionNode> = node
            .children
            .iter()
            .filter_map(|&child| self.finalize(child))
            .collect();
        children.sort_by_key(|c| c.assigned_priority);

        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(RegionNode {
                bounds: node.bounds,
                region_type: None,
                assigned_priority: children[0].assigned_priority,
                children,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PriorityPolygonQueue;
    use geo::polygon;

    fn config(metres: f64) -> CompilerConfig {
        CompilerConfig::default().with_min_cell_length_metres(metres)
    }

    fn rect(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> Polygon {
        bounds_polygon(&Bounds::new(min_lng, max_lng, min_lat, max_lat))
    }

    fn assert_invariants(node: &RegionNode) {
        if node.is_assigned() {
            assert!(node.children.is_empty(), "assigned node has children");
            return;
        }
        assert_ne!(node.children.len(), 1, "single-child level survived");
        for pair in node.children.windows(2) {
            assert!(pair[0].assigned_priority <= pair[1].assigned_priority);
        }
        if let Some(first) = node.children.first() {
            assert_eq!(node.assigned_priority, first.assigned_priority);
        }
        for child in &node.children {
            assert_ne!(child.assigned_priority, UNASSIGNED_PRIORITY);
            assert_invariants(child);
        }
    }

    #[test]
    fn test_new_pre_splits_into_quadrants() {
        let compiler = QuadtreeCompiler::new(&config(10.0)).unwrap();
        assert_eq!(compiler.node_count(), 7);

        let quadrants: Vec<Bounds> = compiler.nodes[ROOT]
            .children
            .iter()
            .flat_map(|&half| compiler.nodes[half].children.iter())
            .map(|&q| compiler.nodes[q].bounds)
            .collect();
        assert_eq!(
            quadrants,
            vec![
                Bounds::new(-180.0, 0.0, -90.0, 0.0),
                Bounds::new(0.0, 180.0, -90.0, 0.0),
                Bounds::new(-180.0, 0.0, 0.0, 90.0),
                Bounds::new(0.0, 180.0, 0.0, 90.0),
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            QuadtreeCompiler::new(&config(0.0)),
            Err(SpeedRegionsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_input_gives_empty_root() {
        let tree = QuadtreeCompiler::compile(&PriorityPolygonQueue::new(), &config(1000.0)).unwrap();
        assert_eq!(tree.count_nodes(), 1);
        assert_eq!(tree.region_type, None);
        assert_eq!(tree.assigned_priority, UNASSIGNED_PRIORITY);
        assert_eq!(tree.bounds, Bounds::global());
    }

    #[test]
    fn test_full_quadrant_collapses_to_one_leaf() {
        for metres in [1_000_000.0, 100_000.0, 1_000.0] {
            let mut queue = PriorityPolygonQueue::new();
            queue.push(rect(0.0, 180.0, 0.0, 90.0), "ne");

            let tree = QuadtreeCompiler::compile(&queue, &config(metres)).unwrap();
            assert_eq!(tree.count_nodes(), 1, "min cell {metres}");
            assert_eq!(tree.region_type.as_deref(), Some("ne"));
            assert_eq!(tree.bounds, Bounds::new(0.0, 180.0, 0.0, 90.0));
            assert_eq!(tree.assigned_priority, 1);
        }
    }

    #[test]
    fn test_tree_invariants_with_overlaps() {
        let mut queue = PriorityPolygonQueue::new();
        queue.push(rect(10.0, 12.0, 40.0, 42.0), "a");
        queue.push(rect(11.0, 14.0, 41.0, 43.0), "b");
        queue.push(
            polygon![(x: -5.0, y: -5.0), (x: 5.0, y: -5.0), (x: 0.0, y: 5.0)],
            "c",
        );

        let tree = QuadtreeCompiler::compile(&queue, &config(20_000.0)).unwrap();
        assert_invariants(&tree);

        let mut regions = std::collections::BTreeSet::new();
        tree.visit_leaves(&mut |leaf| {
            regions.insert(leaf.region_type.clone().unwrap());
        });
        assert_eq!(regions.len(), 3);
    }

    #[test]
    fn test_priority_rank_order_not_input_order() {
        let a = InputPolygon {
            polygon: rect(10.0, 12.0, 40.0, 42.0),
            region_type: "a".into(),
            priority_rank: 1,
        };
        let b = InputPolygon {
            polygon: rect(10.0, 12.0, 40.0, 42.0),
            region_type: "b".into(),
            priority_rank: 2,
        };

        let tree = QuadtreeCompiler::compile([&b, &a], &config(50_000.0)).unwrap();
        tree.visit_leaves(&mut |leaf| assert_eq!(leaf.region_type.as_deref(), Some("a")));
    }

    fn child_bounds(compiler: &QuadtreeCompiler, node: NodeId) -> Vec<Bounds> {
        compiler.nodes[node]
            .children
            .iter()
            .map(|&c| compiler.nodes[c].bounds)
            .collect()
    }

    #[test]
    fn test_can_split_at_exact_minimum() {
        let cell = Bounds::new(0.0, 1.0, -0.5, 0.5);
        let min = cell.height_metres() / 2.0;

        let compiler = QuadtreeCompiler::new(&config(min)).unwrap();
        assert!(compiler.can_split(&cell, SplitAxis::Horizontal));

        let compiler = QuadtreeCompiler::new(&config(min * 1.001)).unwrap();
        assert!(!compiler.can_split(&cell, SplitAxis::Horizontal));
    }

    #[test]
    fn test_can_split_respects_aspect_ratio() {
        let compiler = QuadtreeCompiler::new(&config(1000.0)).unwrap();

        // 4:1 on the equator: halving the height would leave 8:1
        let wide = Bounds::new(0.0, 4.0, -0.5, 0.5);
        assert!(compiler.can_split(&wide, SplitAxis::Vertical));
        assert!(!compiler.can_split(&wide, SplitAxis::Horizontal));

        let tall = Bounds::new(0.0, 1.0, -2.0, 2.0);
        assert!(compiler.can_split(&tall, SplitAxis::Horizontal));
        assert!(!compiler.can_split(&tall, SplitAxis::Vertical));

        // 2:1 halves to exactly 4:1
        let edge = Bounds::new(0.0, 2.0, -0.5, 0.5);
        assert!(compiler.can_split(&edge, SplitAxis::Horizontal));
    }

    #[test]
    fn test_split_prefers_axis_that_separates_fragment() {
        let cell = Bounds::new(0.0, 2.0, 0.0, 2.0);
        let mut compiler = QuadtreeCompiler::new(&config(1000.0)).unwrap();

        // west half only: vertical even though depth 0 favours horizontal
        let node = compiler.push_node(cell);
        compiler.split(node, 0, &rect(0.0, 1.0, 0.0, 2.0)).unwrap();
        assert_eq!(child_bounds(&compiler, node), cell.vertical_split().to_vec());

        // south half only: horizontal even though depth 1 favours vertical
        let node = compiler.push_node(cell);
        compiler.split(node, 1, &rect(0.2, 1.8, 0.2, 0.8)).unwrap();
        assert_eq!(child_bounds(&compiler, node), cell.horizontal_split().to_vec());
    }

    #[test]
    fn test_split_alternates_axis_by_depth() {
        let cell = Bounds::new(0.0, 2.0, 0.0, 2.0);
        let mut compiler = QuadtreeCompiler::new(&config(1000.0)).unwrap();

        // centred fragment: neither split separates it
        let centred = rect(0.5, 1.5, 0.5, 1.5);
        // corner fragment: both splits separate it
        let corner = rect(0.2, 0.8, 0.2, 0.8);

        for fragment in [&centred, &corner] {
            for depth in [0, 1, 2, 3] {
                let node = compiler.push_node(cell);
                compiler.split(node, depth, fragment).unwrap();
                let expected = if depth % 2 == 0 {
                    cell.horizontal_split()
                } else {
                    cell.vertical_split()
                };
                assert_eq!(child_bounds(&compiler, node), expected.to_vec(), "depth {depth}");
            }
        }
    }

    #[test]
    fn test_split_of_minimum_cell_is_an_error() {
        let mut compiler = QuadtreeCompiler::new(&config(1000.0)).unwrap();
        let node = compiler.push_node(Bounds::new(0.0, 0.001, 0.0, 0.001));

        let result = compiler.split(node, 0, &rect(0.0, 0.0005, 0.0, 0.001));
        assert!(matches!(result, Err(SpeedRegionsError::CompilerInvariant(_))));
        assert!(compiler.nodes[node].children.is_empty());
    }

    #[test]
    fn test_leaves_respect_minimum_size_and_aspect() {
        let malta: geojson::FeatureCollection =
            serde_json::from_str(include_str!("../../tests/fixtures/malta.geojson")).unwrap();
        let queue = PriorityPolygonQueue::from_collections([&malta]).unwrap();

        let min = 300.0;
        let tree = QuadtreeCompiler::compile(&queue, &config(min)).unwrap();
        assert_invariants(&tree);

        let mut leaves = 0;
        tree.visit_leaves(&mut |leaf| {
            let (width, height) = (leaf.bounds.width_metres(), leaf.bounds.height_metres());
            assert!(width.min(height) >= min, "{:?} is below {}m", leaf.bounds, min);
            assert!(
                width.min(height) / width.max(height) >= MIN_SIDES_RATIO - SIDES_RATIO_TOLERANCE,
                "{:?} is too elongated",
                leaf.bounds
            );
            leaves += 1;
        });
        assert!(leaves > 1);
    }

    #[test]
    fn test_invalid_polygon_rejected() {
        let bad = InputPolygon {
            polygon: rect(10.0, 200.0, 40.0, 42.0),
            region_type: "a".into(),
            priority_rank: 1,
        };
        assert!(QuadtreeCompiler::compile([&bad], &config(50_000.0)).is_err());
    }
}
