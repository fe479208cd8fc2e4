//! Point-in-polygon and polygon contact tests using the quadrant method.
//!
//! The tested point is moved to the origin and the polygon is walked edge by
//! edge. Every crossing of an axis adds +1 or -1 depending on the direction of
//! travel, so a full turn around the origin sums to +4 or -4. An edge passing
//! exactly through the origin puts the point on the polygon's boundary.
//!
//! Two polygons are compared by testing the vertices of each against the
//! other. Boundaries that cross without either polygon holding a vertex of the
//! other (two bars laid as a plus sign, for instance) are reported as
//! disjoint.

use crate::{util::rect_to_ring, OverlapClass, Precision};
use geo::{Coord, GeoFloat, LineString, Polygon, Rect};
use itertools::Itertools;
use std::borrow::Cow;

/// Closed vertex sequence of a shape, first point repeated as last.
pub trait Vertices<T: GeoFloat> {
    fn vertices(&self) -> Cow<'_, [Coord<T>]>;
}

impl<T: GeoFloat> Vertices<T> for [Coord<T>] {
    fn vertices(&self) -> Cow<'_, [Coord<T>]> {
        Cow::Borrowed(self)
    }
}

impl<T: GeoFloat> Vertices<T> for LineString<T> {
    fn vertices(&self) -> Cow<'_, [Coord<T>]> {
        Cow::Borrowed(self.0.as_slice())
    }
}

impl<T: GeoFloat> Vertices<T> for Polygon<T> {
    fn vertices(&self) -> Cow<'_, [Coord<T>]> {
        Cow::Borrowed(self.exterior().0.as_slice())
    }
}

impl<T: GeoFloat> Vertices<T> for Rect<T> {
    fn vertices(&self) -> Cow<'_, [Coord<T>]> {
        Cow::Owned(rect_to_ring(self).0)
    }
}

/// Where a point lies relative to a polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointLocation<T: GeoFloat> {
    Inside,
    /// The point sits on an edge; carries the touching point.
    Boundary(Coord<T>),
    Outside,
}

impl<T: GeoFloat> PointLocation<T> {
    /// Contribution to the contact degree against a ring of `ring_len` points.
    fn degree(&self, ring_len: usize) -> usize {
        match self {
            PointLocation::Inside => ring_len,
            PointLocation::Boundary(_) => 1,
            PointLocation::Outside => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Summand {
    Walk(i8),
    Origin,
}

fn sign<T: GeoFloat>(value: T) -> i8 {
    if value > T::zero() {
        1
    } else if value < T::zero() {
        -1
    } else {
        0
    }
}

fn ten<T: GeoFloat>() -> T {
    let two = T::one() + T::one();
    let five = two + two + T::one();
    two * five
}

fn rounded_sign<T: GeoFloat>(value: T, precision: Precision) -> i8 {
    match precision {
        Some(digits) => {
            let scale = ten::<T>().powi(digits);
            let scaled = value * scale;
            if !scaled.is_finite() {
                // More digits than the float holds: rounding keeps the value.
                return sign(value);
            }
            if scale == T::zero() {
                return 0;
            }
            sign(scaled.round() / scale)
        }
        None => sign(value),
    }
}

/// Walks one edge of a polygon already moved so the tested point is at the origin.
fn walk_summand<T: GeoFloat>(r1: Coord<T>, r2: Coord<T>, precision: Precision) -> Summand {
    // ty: where the edge crosses the y axis, tx: where it crosses the x axis.
    let ty = (r1.x != r2.x).then(|| r1.x / (r1.x - r2.x));
    let tx = (r1.y != r2.y).then(|| r1.y / (r1.y - r2.y));
    let (tx, ty) = match (tx, ty) {
        (Some(tx), Some(ty)) => (tx, ty),
        (Some(t), None) | (None, Some(t)) => (t, t),
        (None, None) => {
            let at_origin =
                rounded_sign(r1.x, precision) == 0 && rounded_sign(r1.y, precision) == 0;
            return if at_origin {
                Summand::Origin
            } else {
                Summand::Walk(0)
            };
        }
    };
    let sign_x = rounded_sign(r1.x + tx * (r2.x - r1.x), precision);
    let sign_y = rounded_sign(r1.y + ty * (r2.y - r1.y), precision);
    let through_origin = sign_x == 0 && sign_y == 0;
    let on_edge = |t: T| t >= T::zero() && t < T::one();

    let mut summand = 0;
    if on_edge(tx) {
        if through_origin {
            return Summand::Origin;
        }
        summand += sign_x * sign(r2.y - r1.y);
    }
    if on_edge(ty) {
        if through_origin {
            return Summand::Origin;
        }
        summand += sign_y * sign(r1.x - r2.x);
    }
    Summand::Walk(summand)
}

/// Locates `point` against a closed ring.
pub fn point_in_polygon<T: GeoFloat>(
    point: Coord<T>,
    ring: &[Coord<T>],
    precision: Precision,
) -> PointLocation<T> {
    let mut touching = false;
    let mut walk_sum: i32 = 0;
    for (r1, r2) in ring.iter().map(|coord| *coord - point).tuple_windows() {
        match walk_summand(r1, r2, precision) {
            Summand::Walk(summand) => walk_sum += i32::from(summand),
            Summand::Origin => touching = true,
        }
    }
    if walk_sum.abs() == 4 {
        PointLocation::Inside
    } else if touching {
        PointLocation::Boundary(point)
    } else {
        PointLocation::Outside
    }
}

/// Contact of the vertices of `vertices` with the ring `ring`.
///
/// A vertex inside the ring weighs as much as the ring's point count, a vertex
/// on its boundary weighs one. Reaching the point count means overlap.
pub fn polygon_inside<T: GeoFloat>(
    vertices: &[Coord<T>],
    ring: &[Coord<T>],
    precision: Precision,
) -> OverlapClass {
    let mut degree = 0;
    for vertex in vertices {
        degree += point_in_polygon(*vertex, ring, precision).degree(ring.len());
        if degree >= ring.len() {
            return OverlapClass::Overlapping;
        }
    }
    if degree > 0 {
        OverlapClass::Touching
    } else {
        OverlapClass::Disjoint
    }
}

/// Symmetric contact class of two closed rings.
pub fn pair_overlapping<T: GeoFloat>(
    first: &[Coord<T>],
    second: &[Coord<T>],
    precision: Precision,
) -> OverlapClass {
    let forward = polygon_inside(first, second, precision);
    if forward == OverlapClass::Overlapping {
        return forward;
    }
    forward.max(polygon_inside(second, first, precision))
}

/// Contact class of any two closed shapes, e.g. a polygon and a rectangle.
pub fn classify<T, A, B>(first: &A, second: &B, precision: Precision) -> OverlapClass
where
    T: GeoFloat,
    A: Vertices<T> + ?Sized,
    B: Vertices<T> + ?Sized,
{
    pair_overlapping(&first.vertices(), &second.vertices(), precision)
}
