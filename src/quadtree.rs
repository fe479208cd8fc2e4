//! Region index over a polygon collection.
//!
//! Polygons are assigned to quadrants with the same contact test used for
//! pairs, so the index shares its blind spot: a polygon crossing a quadrant
//! without either holding a vertex of the other is not assigned to it, and a
//! query can then miss a polygon that [brute_force] finds. The two agree when
//! regions are squares and no polygon crosses a quadrant that way.

mod node;
mod query;

pub use node::{NodeKind, NodeSummary, Nodes, QuadNode, QuadTree, QuadTreeOptions, TreeStats};
pub use query::brute_force;
