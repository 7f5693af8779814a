//! Multi-hex footprints and hex barriers.
//!
//! The footprint rule is a set of rendering scale classes rather than a
//! geometric disk:
//!
//! | rounded scale | hexes |
//! |---|---|
//! | 1 or other | anchor only |
//! | 2 | anchor, `(q+1, r)`, `(q, r+1)` |
//! | 3 | anchor plus its 6-hex ring |
//! | 4+ | anchor plus two rings (19 hexes) |
//!
//! Only combatants get multi-hex footprints.

use std::collections::BTreeSet;

use crate::hex::{expand, HexCoord, HexGrid, AXIAL_DIRECTIONS};
use crate::item::PlacedItem;
use crate::math::{round_half_even, Point};

/// Hexes covered by an anchor at `anchor` with the given footprint scale.
#[must_use]
pub fn occupied_hexes(anchor: HexCoord, footprint_scale: f64) -> BTreeSet<HexCoord> {
    let mut occupied = BTreeSet::new();
    occupied.insert(anchor);

    match round_half_even(footprint_scale) {
        2 => {
            occupied.insert(anchor.offset(1, 0));
            occupied.insert(anchor.offset(0, 1));
        }
        3 => {
            occupied.extend(AXIAL_DIRECTIONS.iter().map(|&(dq, dr)| anchor.offset(dq, dr)));
        }
        s if s >= 4 => {
            occupied.extend(anchor.within(2));
        }
        _ => {}
    }
    occupied
}

/// Footprint of a placed item. Non-combatants occupy only their anchor.
#[must_use]
pub fn item_footprint(item: &PlacedItem) -> BTreeSet<HexCoord> {
    if item.is_combatant() {
        occupied_hexes(item.position(), item.footprint_scale)
    } else {
        std::iter::once(item.position()).collect()
    }
}

/// Mean pixel center of a hex set, relative to the grid origin.
///
/// Returns the origin for an empty set.
#[must_use]
pub fn centroid(grid: &HexGrid, hexes: &BTreeSet<HexCoord>) -> Point {
    if hexes.is_empty() {
        return Point::ZERO;
    }
    let (sum_x, sum_y) = hexes.iter().fold((0.0, 0.0), |(sx, sy), hex| {
        let (x, y) = grid.hex_to_pixel(*hex);
        (sx + x, sy + y)
    });
    let n = hexes.len() as f64;
    Point::new(sum_x / n, sum_y / n)
}

/// Thickest barrier band drawn; matches the render scan window.
pub const MAX_BARRIER_RADIUS: u32 = 20;

/// Barrier band around a footprint: the footprint grown by `radius` rings,
/// minus the footprint itself. `radius` is capped at [`MAX_BARRIER_RADIUS`].
#[must_use]
pub fn barrier_hexes(footprint: &BTreeSet<HexCoord>, radius: u32) -> BTreeSet<HexCoord> {
    expand(footprint, radius.min(MAX_BARRIER_RADIUS))
        .difference(footprint)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexOrientation;
    use crate::item::ItemKind;

    fn set(hexes: &[(i32, i32)]) -> BTreeSet<HexCoord> {
        hexes.iter().map(|&(q, r)| HexCoord::new(q, r)).collect()
    }

    #[test]
    fn test_scale_one_is_anchor_only() {
        let anchor = HexCoord::new(2, 2);
        assert_eq!(occupied_hexes(anchor, 1.0), set(&[(2, 2)]));
        assert_eq!(occupied_hexes(anchor, 0.8), set(&[(2, 2)]));
        assert_eq!(occupied_hexes(anchor, 0.5), set(&[(2, 2)]));
    }

    #[test]
    fn test_scale_two_is_fixed_cluster() {
        let anchor = HexCoord::new(0, 0);
        assert_eq!(occupied_hexes(anchor, 2.0), set(&[(0, 0), (1, 0), (0, 1)]));
        // 2.5 rounds half-to-even down to 2
        assert_eq!(occupied_hexes(anchor, 2.5).len(), 3);
    }

    #[test]
    fn test_scale_three_is_center_and_ring() {
        let hexes = occupied_hexes(HexCoord::new(5, -3), 3.0);
        assert_eq!(hexes.len(), 7);
        assert!(hexes.iter().all(|h| h.distance(HexCoord::new(5, -3)) <= 1));
    }

    #[test]
    fn test_scale_four_and_up_is_two_rings() {
        for scale in [4.0, 5.0, 8.0] {
            let hexes = occupied_hexes(HexCoord::ORIGIN, scale);
            assert_eq!(hexes.len(), 19);
            for hex in &hexes {
                assert!(hex.q.abs() <= 2 && hex.r.abs() <= 2 && (hex.q + hex.r).abs() <= 2);
            }
        }
    }

    #[test]
    fn test_non_combatant_ignores_scale() {
        let tile = PlacedItem::new("tiles/rock.png", HexCoord::new(1, 1), 3.0).with_kind(ItemKind::Tile);
        assert_eq!(item_footprint(&tile), set(&[(1, 1)]));
    }

    #[test]
    fn test_centroid_of_single_hex_is_its_center() {
        let grid = HexGrid::new(30.0, HexOrientation::PointyTop);
        let hex = HexCoord::new(-2, 4);
        let c = centroid(&grid, &set(&[(-2, 4)]));
        assert_eq!(c, grid.center(hex));
    }

    #[test]
    fn test_centroid_of_ring_is_anchor() {
        let grid = HexGrid::default();
        let anchor = HexCoord::new(3, 1);
        let c = centroid(&grid, &occupied_hexes(anchor, 3.0));
        let expected = grid.center(anchor);
        assert!((c.x - expected.x).abs() < 1e-9);
        assert!((c.y - expected.y).abs() < 1e-9);
    }

    #[test]
    fn test_barrier_excludes_footprint() {
        let footprint = set(&[(0, 0)]);
        let barrier = barrier_hexes(&footprint, 1);
        assert_eq!(barrier.len(), 6);
        assert!(!barrier.contains(&HexCoord::ORIGIN));

        let wide = barrier_hexes(&footprint, 2);
        assert_eq!(wide.len(), 18);
    }

    #[test]
    fn test_barrier_radius_is_capped() {
        let footprint = set(&[(0, 0)]);
        let capped = barrier_hexes(&footprint, MAX_BARRIER_RADIUS);
        assert_eq!(capped.len(), 3 * 20 * 21);
        assert_eq!(barrier_hexes(&footprint, 4_000_000_000), capped);
    }

    #[test]
    fn test_barrier_around_cluster() {
        let footprint = occupied_hexes(HexCoord::ORIGIN, 2.0);
        let barrier = barrier_hexes(&footprint, 1);
        assert!(barrier.is_disjoint(&footprint));
        assert!(barrier.iter().all(|h| footprint.iter().any(|f| f.distance(*h) == 1)));
    }
}
