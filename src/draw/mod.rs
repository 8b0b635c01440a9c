//! Shape model for canvas objects.
//!
//! This module defines the core drawing types used by the scene, history and
//! draw manager:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Shape`]: a canvas object with box geometry, transform and paint style
//! - [`Geometry`]: the closed `Linear` / `Solid` geometry variant
//! - [`Visual`]: the rendered geometry used to compare states

pub mod color;
pub mod shape;

pub use color::Color;
pub use shape::{
    Arrowheads, BoundingRect, Geometry, LineGeometry, ObjectId, Origin, Shape, ShapeFamily,
    ShapeKind, Style, Visual,
};
