use geo::{GeoFloat, Polygon};
use serde::Serialize;
use std::{collections::BTreeMap, fmt::Display};

pub mod algorithm;
pub mod quadtree;
pub mod report;
pub mod util;

pub use algorithm::{
    classify, collection_overlapping, point_in_polygon, polygon_inside, Execution,
    PairwiseOverlap, PointLocation, Vertices,
};
pub use quadtree::{brute_force, NodeKind, NodeSummary, QuadNode, QuadTree, QuadTreeOptions};

/// Identifier of a polygon inside a [PolygonCollection].
pub type PolygonId = u64;

/// Number of decimal digits kept before taking the sign of a crossing
/// coordinate. `None` keeps the exact value.
pub type Precision = Option<i32>;

/// Depth at which construction stops splitting, even if a node still holds
/// more than one polygon.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Degree of contact between two polygons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapClass {
    Disjoint = 0,
    Touching = 1,
    Overlapping = 2,
}

impl OverlapClass {
    /// True for touching and overlapping polygons.
    pub fn is_contact(self) -> bool {
        self > OverlapClass::Disjoint
    }
}

impl Display for OverlapClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlapClass::Disjoint => write!(f, "disjoint"),
            OverlapClass::Touching => write!(f, "touching"),
            OverlapClass::Overlapping => write!(f, "overlapping"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PolygonError {
    #[error("ring has {0} points, at least 3 are required")]
    TooFewPoints(usize),
    #[error("ring is not closed")]
    NotClosed,
    #[error("ring has a non-finite coordinate at position {0}")]
    NonFinite(usize),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("polygon {id} is malformed: {source}")]
pub struct MalformedPolygon {
    pub id: PolygonId,
    #[source]
    pub source: PolygonError,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("cannot index an empty polygon collection")]
    EmptyCollection,
    #[error("invalid bounds: min ({min_x}, {min_y}), max ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("polygons have no positive extent")]
    EmptyExtent,
}

/// Polygons keyed by a unique id, iterated in ascending id order.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonCollection<T: GeoFloat = f64>(BTreeMap<PolygonId, Polygon<T>>);

impl<T: GeoFloat> Default for PolygonCollection<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T: GeoFloat> PolygonCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a polygon, returning the one previously stored under `id`.
    pub fn insert(&mut self, id: PolygonId, polygon: Polygon<T>) -> Option<Polygon<T>> {
        self.0.insert(id, polygon)
    }

    pub fn get(&self, id: PolygonId) -> Option<&Polygon<T>> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolygonId, &Polygon<T>)> {
        self.0.iter().map(|(id, polygon)| (*id, polygon))
    }
}

impl<T: GeoFloat> FromIterator<(PolygonId, Polygon<T>)> for PolygonCollection<T> {
    fn from_iter<I: IntoIterator<Item = (PolygonId, Polygon<T>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
