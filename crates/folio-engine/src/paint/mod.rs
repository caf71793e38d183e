//! Paint model shared between the flip core and renderers.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - two-stop ramps used for fold shadows
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod gradient;

pub use color::Color;
pub use gradient::{ColorStop, LinearRamp};
