//! Contract between the window runtime and the host application.
//!
//! The runtime owns the platform loop; the app sees window events and one
//! [`FrameCtx`] per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
