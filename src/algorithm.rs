mod pairwise;
mod quadrant;

pub use pairwise::{
    collection_overlapping, collection_overlapping_parallel, collection_overlapping_serial,
    Execution, PairwiseOverlap,
};
pub use quadrant::{classify, pair_overlapping, point_in_polygon, polygon_inside, PointLocation, Vertices};
