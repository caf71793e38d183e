//! Input subsystem.
//!
//! Platform-agnostic events, per-window state, and the [`GestureTracker`]
//! that turns pointer or touch sequences into single-finger page gestures.
//! Only `platform` knows about winit.

mod frame;
mod gesture;
pub mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use gesture::{Gesture, GestureTracker};
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, KeyState, Modifiers, MouseButton, TouchEvent, TouchPhase};
