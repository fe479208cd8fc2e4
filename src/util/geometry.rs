use crate::{IndexError, PolygonCollection, PolygonError};
use geo::{GeoFloat, Polygon, Rect};
use geo_types::{coord, LineString};
use log::warn;

/// Closed 5-point boundary of a rectangle, counter-clockwise from its min corner.
pub fn rect_to_ring<T: GeoFloat>(rect: &Rect<T>) -> LineString<T> {
    let (min, max) = (rect.min(), rect.max());
    LineString::new(vec![
        coord! { x: min.x, y: min.y },
        coord! { x: max.x, y: min.y },
        coord! { x: max.x, y: max.y },
        coord! { x: min.x, y: max.y },
        coord! { x: min.x, y: min.y },
    ])
}

pub fn rect_to_polygon<T: GeoFloat>(rect: &Rect<T>) -> Polygon<T> {
    Polygon::new(rect_to_ring(rect), vec![])
}

/// Splits a rectangle at its center into lower-left, lower-right,
/// upper-right and upper-left quadrants, in that order.
pub fn quadrants<T: GeoFloat>(rect: &Rect<T>) -> [Rect<T>; 4] {
    let (min, max, center) = (rect.min(), rect.max(), rect.center());
    [
        Rect::new(min, center),
        Rect::new((center.x, min.y), (max.x, center.y)),
        Rect::new(center, max),
        Rect::new((min.x, center.y), (center.x, max.y)),
    ]
}

/// Checks that a ring is closed, has at least 3 points and only finite coordinates.
pub fn check_ring<T: GeoFloat>(ring: &LineString<T>) -> Result<(), PolygonError> {
    if ring.0.len() < 3 {
        return Err(PolygonError::TooFewPoints(ring.0.len()));
    }
    if let Some(position) = ring
        .0
        .iter()
        .position(|coord| !coord.x.is_finite() || !coord.y.is_finite())
    {
        return Err(PolygonError::NonFinite(position));
    }
    if !ring.is_closed() {
        return Err(PolygonError::NotClosed);
    }
    Ok(())
}

/// Rejects rectangles with non-finite corners or without area.
pub fn check_bounds<T: GeoFloat>(rect: &Rect<T>) -> Result<(), IndexError> {
    let (min, max) = (rect.min(), rect.max());
    let finite = [min.x, min.y, max.x, max.y].iter().all(|value| value.is_finite());
    if finite && min.x < max.x && min.y < max.y {
        return Ok(());
    }
    Err(IndexError::InvalidBounds {
        min_x: min.x.to_f64().unwrap_or(f64::NAN),
        min_y: min.y.to_f64().unwrap_or(f64::NAN),
        max_x: max.x.to_f64().unwrap_or(f64::NAN),
        max_y: max.y.to_f64().unwrap_or(f64::NAN),
    })
}

/// Root rectangle for a collection: the maximum X and Y are each rounded up
/// to the next power of two, the minimum is pinned at the origin.
pub fn power_of_two_bounds(collection: &PolygonCollection<f64>) -> Result<Rect<f64>, IndexError> {
    if collection.is_empty() {
        return Err(IndexError::EmptyCollection);
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (0.0_f64, 0.0_f64);
    for coord in collection
        .iter()
        .flat_map(|(_, polygon)| polygon.exterior().0.iter())
    {
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
        max_x = max_x.max(coord.x);
        max_y = max_y.max(coord.y);
    }
    if min_x < 0.0 || min_y < 0.0 {
        warn!("Negative coordinates ({min_x}, {min_y}) fall outside the root rectangle.");
    }
    if max_x <= 0.0 || max_y <= 0.0 {
        return Err(IndexError::EmptyExtent);
    }
    Ok(Rect::new(
        (0.0, 0.0),
        (next_power_of_two(max_x), next_power_of_two(max_y)),
    ))
}

fn next_power_of_two(value: f64) -> f64 {
    2f64.powf(value.log2().ceil())
}
