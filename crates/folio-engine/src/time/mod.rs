//! Frame timing.
//!
//! One [`FrameClock`] per render loop; `tick()` once per presented frame.
//! The flip engine only ever sees the resulting `dt`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
