//! Axial hex coordinates and the hex grid's pixel transform.
//!
//! Coordinates are axial `(q, r)`; the cube coordinate `s = -q - r` is
//! derived and never stored. A [`HexGrid`] converts between axial
//! coordinates and pixel space for one fixed orientation and cell size.
//!
//! # Example
//!
//! ```
//! use hexmap_core::hex::{HexCoord, HexGrid, HexOrientation};
//!
//! let grid = HexGrid::new(50.0, HexOrientation::FlatTop);
//! let (x, y) = grid.hex_to_pixel(HexCoord::new(3, -2));
//! assert_eq!(grid.pixel_to_hex(x, y), HexCoord::new(3, -2));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::Point;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// The six axial unit directions, counter-clockwise starting east.
pub const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Axial hex coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// The origin hex.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Create a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Derived cube coordinate `s = -q - r`.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Offset by an axial delta.
    #[must_use]
    pub const fn offset(self, dq: i32, dr: i32) -> Self {
        Self::new(self.q + dq, self.r + dr)
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.q - other.q + self.r - other.r).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The six adjacent hexes in [`AXIAL_DIRECTIONS`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        AXIAL_DIRECTIONS.map(|(dq, dr)| self.offset(dq, dr))
    }

    /// All hexes within `range` steps, including `self`.
    #[must_use]
    pub fn within(self, range: u32) -> Vec<Self> {
        let n = range as i32;
        let mut hexes = Vec::with_capacity((3 * n * (n + 1) + 1) as usize);
        for dq in -n..=n {
            for dr in (-n).max(-dq - n)..=n.min(-dq + n) {
                hexes.push(self.offset(dq, dr));
            }
        }
        hexes
    }

    /// Hexes at exactly `radius` steps. A radius of zero yields `self`.
    #[must_use]
    pub fn ring(self, radius: u32) -> Vec<Self> {
        if radius == 0 {
            return vec![self];
        }
        let n = radius as i32;
        let (sq, sr) = AXIAL_DIRECTIONS[4];
        let mut cursor = self.offset(sq * n, sr * n);
        let mut hexes = Vec::with_capacity(6 * radius as usize);
        for (dq, dr) in AXIAL_DIRECTIONS {
            for _ in 0..radius {
                hexes.push(cursor);
                cursor = cursor.offset(dq, dr);
            }
        }
        hexes
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Expand a hex set outward by `steps` neighbor rings.
#[must_use]
pub fn expand(hexes: &BTreeSet<HexCoord>, steps: u32) -> BTreeSet<HexCoord> {
    let mut current = hexes.clone();
    for _ in 0..steps {
        let mut next = current.clone();
        for hex in &current {
            next.extend(hex.neighbors());
        }
        current = next;
    }
    current
}

/// Grid orientation, fixed per grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HexOrientation {
    /// Flat edge on top; columns of hexes.
    #[default]
    FlatTop,
    /// Corner on top; rows of hexes.
    PointyTop,
}

/// Hex grid geometry: outer radius and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexGrid {
    /// Outer radius (center to corner) in pixels.
    pub size: f64,
    /// Orientation of every cell.
    pub orientation: HexOrientation,
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::new(50.0, HexOrientation::FlatTop)
    }
}

impl HexGrid {
    /// Create a grid with the given outer radius.
    #[must_use]
    pub const fn new(size: f64, orientation: HexOrientation) -> Self {
        Self { size, orientation }
    }

    /// Whether this grid is flat-topped.
    #[must_use]
    pub fn is_flat_top(&self) -> bool {
        self.orientation == HexOrientation::FlatTop
    }

    /// Bounding width of one cell.
    #[must_use]
    pub fn width(&self) -> f64 {
        match self.orientation {
            HexOrientation::FlatTop => 2.0 * self.size,
            HexOrientation::PointyTop => SQRT_3 * self.size,
        }
    }

    /// Bounding height of one cell.
    #[must_use]
    pub fn height(&self) -> f64 {
        match self.orientation {
            HexOrientation::FlatTop => SQRT_3 * self.size,
            HexOrientation::PointyTop => 2.0 * self.size,
        }
    }

    /// Pixel center of a hex, relative to the grid origin.
    #[must_use]
    pub fn hex_to_pixel(&self, hex: HexCoord) -> (f64, f64) {
        let q = f64::from(hex.q);
        let r = f64::from(hex.r);
        match self.orientation {
            HexOrientation::FlatTop => (
                self.size * 1.5 * q,
                self.size * (SQRT_3 / 2.0 * q + SQRT_3 * r),
            ),
            HexOrientation::PointyTop => (
                self.size * (SQRT_3 * q + SQRT_3 / 2.0 * r),
                self.size * 1.5 * r,
            ),
        }
    }

    /// Pixel center of a hex as a [`Point`].
    #[must_use]
    pub fn center(&self, hex: HexCoord) -> Point {
        let (x, y) = self.hex_to_pixel(hex);
        Point::new(x, y)
    }

    /// Fractional axial coordinates of a pixel position.
    #[must_use]
    pub fn pixel_to_fractional(&self, x: f64, y: f64) -> (f64, f64) {
        match self.orientation {
            HexOrientation::FlatTop => (
                (2.0 / 3.0 * x) / self.size,
                (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / self.size,
            ),
            HexOrientation::PointyTop => (
                (SQRT_3 / 3.0 * x - 1.0 / 3.0 * y) / self.size,
                (2.0 / 3.0 * y) / self.size,
            ),
        }
    }

    /// The hex containing a pixel position.
    #[must_use]
    pub fn pixel_to_hex(&self, x: f64, y: f64) -> HexCoord {
        let (q, r) = self.pixel_to_fractional(x, y);
        axial_round(q, r)
    }

    /// The six corner points of the cell centered at `center`.
    ///
    /// Flat-top corners sit at `60°·i`, pointy-top at `60°·i − 30°`.
    #[must_use]
    pub fn corners(&self, center: Point, radius: f64) -> [Point; 6] {
        let start = if self.is_flat_top() { 0.0 } else { -30.0 };
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 + start).to_radians();
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
    }
}

/// Round fractional axial coordinates to the nearest hex.
///
/// Each cube component is rounded independently, then the component with the
/// largest rounding error is recomputed from the other two so that
/// `q + r + s == 0` holds.
#[must_use]
pub fn axial_round(q: f64, r: f64) -> HexCoord {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    HexCoord::new(rq as i32, rr as i32)
}
