//! Window runtime: owns the winit event loop and the one window the book is
//! drawn into, and drives [`crate::core::App`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
