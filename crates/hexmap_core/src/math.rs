//! Numeric types shared across the core.
//!
//! Geometry (world, screen and pixel space) uses `f64`. Dice modifiers and
//! totals use fixed-point so that decimal modifiers such as `1d6+0.5` add up
//! exactly and the same inputs always produce the same totals.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for dice arithmetic.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// A 2D point in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise offset.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Round half to even, matching the rounding used for footprint classes.
#[must_use]
pub fn round_half_even(value: f64) -> i64 {
    let floor = value.floor();
    let diff = value - floor;
    let rounded = if diff > 0.5 {
        floor + 1.0
    } else if diff < 0.5 {
        floor
    } else if floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    };
    rounded as i64
}

/// Round a fixed-point value up to the next whole number.
///
/// Saturates at the `i32` range instead of overflowing.
#[must_use]
pub fn ceil_to_int(value: Fixed) -> i32 {
    value.saturating_ceil().saturating_to_num::<i32>()
}
