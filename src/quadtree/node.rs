use crate::{
    algorithm::pair_overlapping,
    util::{check_bounds, check_ring, quadrants, rect_to_ring},
    IndexError, OverlapClass, PolygonCollection, PolygonId, Precision, DEFAULT_MAX_DEPTH,
};
use geo::{GeoFloat, Rect};
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadTreeOptions {
    /// Decimal digits used by every contact test of the index.
    pub precision: Precision,
    /// Nodes at this depth are never split.
    pub max_depth: usize,
}

impl Default for QuadTreeOptions {
    fn default() -> Self {
        QuadTreeOptions {
            precision: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Branch,
    Leaf,
}

/// A rectangle of the index and the polygons assigned to it.
///
/// A node with children always has exactly four, in quadrant order: lower-left,
/// lower-right, upper-right, upper-left. A polygon straddling a quadrant
/// boundary is assigned to every quadrant it touches.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadNode<T: GeoFloat> {
    pub(super) rect: Rect<T>,
    pub(super) depth: usize,
    pub(super) ids: Vec<PolygonId>,
    pub(super) children: Option<Box<[QuadNode<T>; 4]>>,
}

impl<T: GeoFloat> QuadNode<T> {
    pub fn rect(&self) -> Rect<T> {
        self.rect
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn ids(&self) -> &[PolygonId] {
        &self.ids
    }

    pub fn children(&self) -> Option<&[QuadNode<T>; 4]> {
        self.children.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn kind(&self) -> NodeKind {
        if self.depth == 0 {
            NodeKind::Root
        } else if self.is_leaf() {
            NodeKind::Leaf
        } else {
            NodeKind::Branch
        }
    }

    /// Depth-first traversal, each node before its children.
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes { stack: vec![self] }
    }
}

pub struct Nodes<'a, T: GeoFloat> {
    stack: Vec<&'a QuadNode<T>>,
}

impl<'a, T: GeoFloat> Iterator for Nodes<'a, T> {
    type Item = &'a QuadNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = &node.children {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}

/// Flat description of a node, for renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSummary {
    pub depth: usize,
    pub kind: NodeKind,
    /// `[min_x, min_y, max_x, max_y]`
    pub rect: [f64; 4],
    pub ids: Vec<PolygonId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub branches: usize,
    pub leaves: usize,
    /// Leaves holding several polygons, cut off at the maximum depth or
    /// because no quadrant separates them.
    pub bucket_leaves: usize,
    pub depth: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuadTree<T: GeoFloat> {
    root: QuadNode<T>,
    options: QuadTreeOptions,
}

impl<T: GeoFloat> QuadTree<T> {
    /// Builds the index over `bounds`. The tree is not modified afterwards.
    pub fn build(
        collection: &PolygonCollection<T>,
        bounds: Rect<T>,
        options: QuadTreeOptions,
    ) -> Result<Self, IndexError> {
        if collection.is_empty() {
            return Err(IndexError::EmptyCollection);
        }
        check_bounds(&bounds)?;
        let malformed: BTreeSet<PolygonId> = collection
            .iter()
            .filter_map(|(id, polygon)| match check_ring(polygon.exterior()) {
                Ok(()) => None,
                Err(err) => {
                    warn!("Polygon {id} is left out of quadrant assignment: {err}.");
                    Some(id)
                }
            })
            .collect();
        let builder = Builder {
            collection,
            malformed: &malformed,
            options: &options,
        };
        let root = builder.node(bounds, collection.ids().collect(), 0);
        let tree = QuadTree { root, options };
        debug!("Built quadtree over {} polygons: {:?}.", collection.len(), tree.stats());
        Ok(tree)
    }

    pub fn root(&self) -> &QuadNode<T> {
        &self.root
    }

    pub fn options(&self) -> QuadTreeOptions {
        self.options
    }

    pub fn nodes(&self) -> Nodes<'_, T> {
        self.root.nodes()
    }

    pub fn summaries(&self) -> Vec<NodeSummary> {
        self.nodes()
            .map(|node| {
                let (min, max) = (node.rect.min(), node.rect.max());
                NodeSummary {
                    depth: node.depth,
                    kind: node.kind(),
                    rect: [min.x, min.y, max.x, max.y].map(|value| value.to_f64().unwrap_or(f64::NAN)),
                    ids: node.ids.clone(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> TreeStats {
        self.nodes().fold(TreeStats::default(), |mut stats, node| {
            stats.nodes += 1;
            stats.depth = stats.depth.max(node.depth);
            if node.is_leaf() {
                stats.leaves += 1;
                if node.ids.len() > 1 {
                    stats.bucket_leaves += 1;
                }
            } else {
                stats.branches += 1;
            }
            stats
        })
    }
}

struct Builder<'a, T: GeoFloat> {
    collection: &'a PolygonCollection<T>,
    malformed: &'a BTreeSet<PolygonId>,
    options: &'a QuadTreeOptions,
}

impl<T: GeoFloat> Builder<'_, T> {
    fn node(&self, rect: Rect<T>, ids: Vec<PolygonId>, depth: usize) -> QuadNode<T> {
        if ids.len() <= 1 || depth >= self.options.max_depth {
            return QuadNode {
                rect,
                depth,
                ids,
                children: None,
            };
        }
        trace!("Splitting node at depth {depth} holding {} polygons.", ids.len());
        let quadrants = quadrants(&rect);
        let boundaries = quadrants.map(|quadrant| rect_to_ring(&quadrant));
        let mut assigned: [Vec<PolygonId>; 4] = Default::default();
        for &id in &ids {
            if self.malformed.contains(&id) {
                continue;
            }
            let Some(polygon) = self.collection.get(id) else {
                continue;
            };
            for (boundary, quadrant_ids) in boundaries.iter().zip(assigned.iter_mut()) {
                let class = pair_overlapping(
                    &polygon.exterior().0,
                    &boundary.0,
                    self.options.precision,
                );
                if class > OverlapClass::Disjoint {
                    quadrant_ids.push(id);
                }
            }
        }
        // Every quadrant lies in the shared area of all ids: splitting
        // further cannot separate them.
        if assigned.iter().all(|quadrant_ids| quadrant_ids.len() == ids.len()) {
            trace!("Node at depth {depth} cannot separate its polygons, keeping it as a leaf.");
            return QuadNode {
                rect,
                depth,
                ids,
                children: None,
            };
        }
        let [lower_left, lower_right, upper_right, upper_left] = quadrants;
        let [ids_ll, ids_lr, ids_ur, ids_ul] = assigned;
        let children = Box::new([
            self.node(lower_left, ids_ll, depth + 1),
            self.node(lower_right, ids_lr, depth + 1),
            self.node(upper_right, ids_ur, depth + 1),
            self.node(upper_left, ids_ul, depth + 1),
        ]);
        QuadNode {
            rect,
            depth,
            ids,
            children: Some(children),
        }
    }
}
