use super::quadrant::pair_overlapping;
use crate::{
    util::check_ring, MalformedPolygon, OverlapClass, PolygonCollection, PolygonId, Precision,
};
use geo::{Coord, GeoFloat, Polygon};
use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;

/// How the pairwise comparisons are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    Serial,
    /// Fan out over a dedicated rayon pool. `None` uses rayon's default
    /// thread count.
    Parallel { workers: Option<usize> },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Parallel { workers: None }
    }
}

pub fn collection_overlapping_serial<T: GeoFloat>(
    rings: &[&[Coord<T>]],
    precision: Precision,
) -> Vec<(usize, usize, OverlapClass)> {
    rings
        .iter()
        .enumerate()
        .tuple_combinations()
        .map(|((i, first), (j, second))| (i, j, pair_overlapping(first, second, precision)))
        .collect()
}

/// All pairs `(index, j)` with `j > index`, in increasing `j`.
fn overlapping_job<T: GeoFloat>(
    rings: &[&[Coord<T>]],
    index: usize,
    precision: Precision,
) -> Vec<(usize, usize, OverlapClass)> {
    rings
        .iter()
        .enumerate()
        .skip(index + 1)
        .map(|(j, other)| (index, j, pair_overlapping(rings[index], other, precision)))
        .collect()
}

/// One job per outer index, run on a pool of `workers` threads.
pub fn collection_overlapping_parallel<T: GeoFloat + Send + Sync>(
    rings: &[&[Coord<T>]],
    precision: Precision,
    workers: Option<usize>,
) -> Result<Vec<(usize, usize, OverlapClass)>, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.unwrap_or(0))
        .build()?;
    Ok(pool.install(|| {
        (0..rings.len())
            .into_par_iter()
            .flat_map_iter(|index| overlapping_job(rings, index, precision))
            .collect()
    }))
}

/// Contact class of every unordered pair of rings. Falls back to the serial
/// path when the parallel pool cannot be started.
pub fn collection_overlapping<T: GeoFloat + Send + Sync>(
    rings: &[&[Coord<T>]],
    precision: Precision,
    execution: Execution,
) -> Vec<(usize, usize, OverlapClass)> {
    match execution {
        Execution::Serial => collection_overlapping_serial(rings, precision),
        Execution::Parallel { workers } => {
            match collection_overlapping_parallel(rings, precision, workers) {
                Ok(overlaps) => overlaps,
                Err(err) => {
                    warn!("Could not start the worker pool ({err}), running serially.");
                    collection_overlapping_serial(rings, precision)
                }
            }
        }
    }
}

pub trait PairwiseOverlap<T: GeoFloat> {
    type Id;

    /// Contact class of every unordered pair, smaller id first.
    fn pairwise_overlaps(
        &self,
        precision: Precision,
        execution: Execution,
    ) -> Result<Vec<(Self::Id, Self::Id, OverlapClass)>, MalformedPolygon>;
}

impl<T: GeoFloat + Send + Sync> PairwiseOverlap<T> for [Polygon<T>] {
    type Id = usize;

    fn pairwise_overlaps(
        &self,
        precision: Precision,
        execution: Execution,
    ) -> Result<Vec<(usize, usize, OverlapClass)>, MalformedPolygon> {
        let rings = self
            .iter()
            .enumerate()
            .map(|(index, polygon)| ring_of(index as PolygonId, polygon))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(collection_overlapping(&rings, precision, execution))
    }
}

impl<T: GeoFloat + Send + Sync> PairwiseOverlap<T> for PolygonCollection<T> {
    type Id = PolygonId;

    fn pairwise_overlaps(
        &self,
        precision: Precision,
        execution: Execution,
    ) -> Result<Vec<(PolygonId, PolygonId, OverlapClass)>, MalformedPolygon> {
        let (ids, rings): (Vec<PolygonId>, Vec<&[Coord<T>]>) = self
            .iter()
            .map(|(id, polygon)| ring_of(id, polygon).map(|ring| (id, ring)))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unzip();
        let overlaps = collection_overlapping(&rings, precision, execution);
        debug!(
            "Compared {} pairs of {} polygons.",
            overlaps.len(),
            ids.len()
        );
        Ok(overlaps
            .into_iter()
            .map(|(i, j, class)| (ids[i], ids[j], class))
            .collect())
    }
}

fn ring_of<T: GeoFloat>(id: PolygonId, polygon: &Polygon<T>) -> Result<&[Coord<T>], MalformedPolygon> {
    check_ring(polygon.exterior()).map_err(|source| MalformedPolygon { id, source })?;
    Ok(polygon.exterior().0.as_slice())
}
