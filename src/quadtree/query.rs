use super::node::{QuadNode, QuadTree};
use crate::{
    algorithm::{pair_overlapping, Vertices},
    util::{check_ring, rect_to_ring},
    OverlapClass, PolygonCollection, PolygonId, Precision,
};
use geo::{Coord, GeoFloat};
use log::debug;
use std::collections::BTreeSet;

impl<T: GeoFloat> QuadNode<T> {
    /// Ids held by leaves whose rectangle is in contact with `region`.
    ///
    /// Rectangle-level only: candidates still have to be checked against
    /// their true shape.
    pub fn sample<R: Vertices<T> + ?Sized>(
        &self,
        region: &R,
        precision: Precision,
    ) -> BTreeSet<PolygonId> {
        let mut candidates = BTreeSet::new();
        self.sample_into(&region.vertices(), precision, &mut candidates);
        candidates
    }

    fn sample_into(
        &self,
        region: &[Coord<T>],
        precision: Precision,
        candidates: &mut BTreeSet<PolygonId>,
    ) {
        let boundary = rect_to_ring(&self.rect);
        if pair_overlapping(&boundary.0, region, precision) == OverlapClass::Disjoint {
            return;
        }
        match &self.children {
            None => candidates.extend(self.ids.iter().copied()),
            Some(children) => children
                .iter()
                .for_each(|child| child.sample_into(region, precision, candidates)),
        }
    }
}

impl<T: GeoFloat> QuadTree<T> {
    pub fn sample<R: Vertices<T> + ?Sized>(&self, region: &R) -> BTreeSet<PolygonId> {
        self.root().sample(region, self.options().precision)
    }

    /// Ids of the polygons of `collection` touching or overlapping `region`.
    ///
    /// `collection` must be the one the tree was built from.
    pub fn query<R: Vertices<T> + ?Sized>(
        &self,
        collection: &PolygonCollection<T>,
        region: &R,
    ) -> BTreeSet<PolygonId> {
        let precision = self.options().precision;
        let region = region.vertices();
        let candidates = self.sample(region.as_ref());
        let found: BTreeSet<PolygonId> = candidates
            .iter()
            .copied()
            .filter(|id| touches(collection, *id, &region, precision))
            .collect();
        debug!(
            "Query kept {} of {} sampled candidates.",
            found.len(),
            candidates.len()
        );
        found
    }
}

/// Linear scan over the whole collection; skips malformed polygons.
pub fn brute_force<T, R>(
    collection: &PolygonCollection<T>,
    region: &R,
    precision: Precision,
) -> BTreeSet<PolygonId>
where
    T: GeoFloat,
    R: Vertices<T> + ?Sized,
{
    let region = region.vertices();
    collection
        .ids()
        .filter(|id| touches(collection, *id, &region, precision))
        .collect()
}

fn touches<T: GeoFloat>(
    collection: &PolygonCollection<T>,
    id: PolygonId,
    region: &[Coord<T>],
    precision: Precision,
) -> bool {
    let Some(polygon) = collection.get(id) else {
        return false;
    };
    if let Err(err) = check_ring(polygon.exterior()) {
        debug!("Skipping polygon {id}: {err}.");
        return false;
    }
    pair_overlapping(&polygon.exterior().0, region, precision).is_contact()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{util::rect_to_polygon, QuadTreeOptions};
    use geo::{polygon, Polygon, Rect};

    fn square(x: f64, y: f64, side: f64) -> Polygon {
        polygon![
            (x: x, y: y),
            (x: x + side, y: y),
            (x: x + side, y: y + side),
            (x: x, y: y + side),
            (x: x, y: y)
        ]
    }

    fn lakes() -> PolygonCollection {
        [
            (11, square(100., 100., 50.)),
            (12, square(600., 120., 80.)),
            (13, polygon![(x: 300., y: 700.), (x: 420., y: 640.), (x: 380., y: 820.), (x: 300., y: 700.)]),
            (14, square(820., 820., 120.)),
            (15, square(480., 480., 30.)),
        ]
        .into_iter()
        .collect()
    }

    fn tree(collection: &PolygonCollection) -> QuadTree<f64> {
        QuadTree::build(
            collection,
            Rect::new((0., 0.), (1000., 1000.)),
            QuadTreeOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn full_root_returns_everything() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = rect_to_polygon(&Rect::new((0., 0.), (1000., 1000.)));
        let found = tree.query(&collection, &region);
        assert_eq!(found, BTreeSet::from([11, 12, 13, 14, 15]));
        assert_eq!(found, brute_force(&collection, &region, None));
    }

    #[test]
    fn region_outside_every_polygon() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = Rect::new((2000., 2000.), (2500., 2500.));
        assert!(tree.sample(&region).is_empty());
        assert!(tree.query(&collection, &region).is_empty());
        assert!(brute_force(&collection, &region, None).is_empty());
    }

    #[test]
    fn region_between_polygons_samples_but_finds_nothing() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = Rect::new((160., 160.), (240., 240.));
        assert_eq!(tree.sample(&region), BTreeSet::from([11]));
        assert!(tree.query(&collection, &region).is_empty());
    }

    #[test]
    fn partial_region() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = Rect::new((120., 120.), (500., 500.));
        let found = tree.query(&collection, &region);
        assert_eq!(found, BTreeSet::from([11, 15]));
        assert!(tree.sample(&region).is_superset(&found));
    }

    #[test]
    fn region_touching_a_polygon_edge() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = Rect::new((150., 110.), (200., 140.));
        assert_eq!(tree.query(&collection, &region), BTreeSet::from([11]));
    }

    #[test]
    fn repeated_queries_agree() {
        let collection = lakes();
        let tree = tree(&collection);
        let region = polygon![(x: 250., y: 600.), (x: 900., y: 600.), (x: 900., y: 950.), (x: 250., y: 600.)];
        let first = tree.query(&collection, &region);
        assert_eq!(first, tree.query(&collection, &region));
        assert_eq!(first, brute_force(&collection, &region, None));
    }

    #[test]
    fn brute_force_skips_malformed_polygons() {
        let mut collection = lakes();
        collection.insert(99, Polygon::new(vec![(0., 0.), (f64::NAN, 5.), (0., 0.)].into(), vec![]));
        let region = Rect::new((0., 0.), (1000., 1000.));
        assert_eq!(
            brute_force(&collection, &region, None),
            BTreeSet::from([11, 12, 13, 14, 15])
        );
        let tree = tree(&collection);
        assert_eq!(tree.query(&collection, &region), BTreeSet::from([11, 12, 13, 14, 15]));
    }

    // The bar crosses quadrant (4,0)-(8,4) without either holding a vertex of
    // the other, so the bar is never assigned there.
    #[test]
    fn bar_crossing_a_quadrant_is_missed_by_the_index() {
        let collection: PolygonCollection = [
            (1, rect_to_polygon(&Rect::new((1., 2.), (15., 3.)))),
            (2, square(1., 5., 1.)),
        ]
        .into_iter()
        .collect();
        let tree = QuadTree::build(
            &collection,
            Rect::new((0., 0.), (16., 16.)),
            QuadTreeOptions::default(),
        )
        .unwrap();
        let crossed = &tree.root().children().unwrap()[0].children().unwrap()[1];
        assert_eq!(crossed.rect(), Rect::new((4., 0.), (8., 4.)));
        assert!(crossed.ids().is_empty());

        let region = Rect::new((5., 2.2), (6., 2.8));
        assert!(tree.query(&collection, &region).is_empty());
        assert_eq!(brute_force(&collection, &region, None), BTreeSet::from([1]));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // Rectangles inset into distinct cells of an 8x8 grid over a 1024 root,
        // so no two polygons touch and none crosses a quadrant.
        fn grid_rects() -> impl Strategy<Value = PolygonCollection> {
            prop::collection::btree_map(
                (0u8..8, 0u8..8),
                (0u8..20, 0u8..20, 8u8..100, 8u8..100),
                1..24,
            )
            .prop_map(|cells| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(id, ((column, row), (inset_x, inset_y, width, height)))| {
                        let x = f64::from(column) * 128. + 4. + f64::from(inset_x);
                        let y = f64::from(row) * 128. + 4. + f64::from(inset_y);
                        let rect = Rect::new((x, y), (x + f64::from(width), y + f64::from(height)));
                        (id as PolygonId, rect_to_polygon(&rect))
                    })
                    .collect::<PolygonCollection>()
            })
        }

        // Square regions, so a region and a quadrant never cross either.
        fn region() -> impl Strategy<Value = Rect<f64>> {
            (0u16..1100, 0u16..1100, 1u16..500).prop_map(|(x, y, side)| {
                let (x, y, side) = (f64::from(x), f64::from(y), f64::from(side));
                Rect::new((x, y), (x + side, y + side))
            })
        }

        proptest! {
            #[test]
            fn index_matches_brute_force(collection in grid_rects(), region in region()) {
                let options = QuadTreeOptions { precision: Some(6), ..Default::default() };
                let tree = QuadTree::build(&collection, Rect::new((0., 0.), (1024., 1024.)), options)
                    .unwrap();
                prop_assert_eq!(
                    tree.query(&collection, &region),
                    brute_force(&collection, &region, Some(6))
                );
            }

            #[test]
            fn leaf_invariant(collection in grid_rects()) {
                let tree = QuadTree::build(
                    &collection,
                    Rect::new((0., 0.), (1024., 1024.)),
                    QuadTreeOptions::default(),
                )
                .unwrap();
                for node in tree.nodes() {
                    if node.is_leaf() {
                        prop_assert!(node.ids().len() <= 1);
                    } else {
                        prop_assert!(node.ids().len() >= 2);
                    }
                }
            }
        }
    }
}
