//! Prioritised input polygons.
//!
//! Polygons are ranked by (feature collection, feature, member polygon).
//! Rank 1 is the highest priority and wins every overlap.

use crate::compute::geojson::region_feature;
use crate::error::Result;
use crate::text::std_string;
use geo::Polygon;
use geojson::FeatureCollection;

/// A simple polygon ready for insertion into the quadtree.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPolygon {
    pub polygon: Polygon,
    /// Standardised region type
    pub region_type: String,
    pub priority_rank: u64,
}

/// Input polygons in ascending priority rank.
#[derive(Debug, Clone, Default)]
pub struct PriorityPolygonQueue {
    polygons: Vec<InputPolygon>,
    collections: usize,
}

impl PriorityPolygonQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a queue from feature collections in priority order.
    ///
    /// Every feature is validated; the first invalid one aborts the build.
    pub fn from_collections<'a, I>(collections: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeatureCollection>,
    {
        let mut queue = Self::new();
        for collection in collections {
            queue.push_collection(collection)?;
        }
        Ok(queue)
    }

    /// Appends every polygon of `collection` behind those already queued.
    ///
    /// The whole collection is validated before any polygon is added, so a
    /// failed call leaves the queue unchanged.
    pub fn push_collection(&mut self, collection: &FeatureCollection) -> Result<()> {
        self.push_collection_at(self.collections, collection)
    }

    /// Like [`push_collection`](Self::push_collection), but errors name the
    /// collection as `index`. Later collections are numbered from `index + 1`.
    pub fn push_collection_at(&mut self, index: usize, collection: &FeatureCollection) -> Result<()> {
        let features = collection
            .features
            .iter()
            .enumerate()
            .map(|(i, feature)| region_feature(index, i, feature))
            .collect::<Result<Vec<_>>>()?;

        for feature in features {
            for polygon in feature.geometry.into_polygons() {
                self.push(polygon, &feature.region_type);
            }
        }

        self.collections = index + 1;
        Ok(())
    }

    /// Appends a single polygon and returns its rank.
    pub fn push(&mut self, polygon: Polygon, region_type: &str) -> u64 {
        let priority_rank = self.polygons.len() as u64 + 1;
        self.polygons.push(InputPolygon {
            polygon,
            region_type: std_string(region_type),
            priority_rank,
        });
        priority_rank
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InputPolygon> {
        self.polygons.iter()
    }

    pub fn as_slice(&self) -> &[InputPolygon] {
        &self.polygons
    }

    pub fn into_vec(self) -> Vec<InputPolygon> {
        self.polygons
    }
}

impl<'a> IntoIterator for &'a PriorityPolygonQueue {
    type Item = &'a InputPolygon;
    type IntoIter = std::slice::Iter<'a, InputPolygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
