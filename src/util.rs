//! Utility functions for colors and canvas geometry.
//!
//! This module provides:
//! - Color name lookup used by the configuration layer
//! - The canvas-space [`Point`] type and rotation helper
//! - Anchor-relative span normalisation used while sizing shapes

use crate::draw::{Color, color::*};
use serde::{Deserialize, Serialize};

// ============================================================================
// Geometry
// ============================================================================

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise offset.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotates `p` clockwise by `degrees` around the origin (screen coordinates, y down).
pub fn rotate(p: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Normalises a signed span from `anchor` to `pointer` along one axis.
///
/// Returns `(start, length)` with a non-negative length. When the pointer is
/// before the anchor the start moves back by the delta instead of the length
/// going negative.
///
/// # Examples
/// ```
/// use inkboard::util::normalize_span;
/// assert_eq!(normalize_span(50.0, 20.0), (20.0, 30.0));
/// assert_eq!(normalize_span(10.0, 25.0), (10.0, 15.0));
/// ```
pub fn normalize_span(anchor: f64, pointer: f64) -> (f64, f64) {
    let delta = pointer - anchor;
    if delta < 0.0 {
        (anchor + delta, -delta)
    } else {
        (anchor, delta)
    }
}

/// Approximate equality for canvas coordinates.
///
/// Geometry passes through rotations and scale folding, so exact float
/// comparison is too strict for fidelity checks.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}
