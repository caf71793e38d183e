//! Page-curl core: gestures, fold geometry, shading and texture slots.
//!
//! Nothing here touches the GPU. [`PageFlip`] is generic over the texture
//! handle a [`TextureUploader`] produces, so the whole state machine runs in
//! plain unit tests.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod mesh;
pub mod policy;
pub mod scroller;
pub mod shadow;
pub mod state;
pub mod texture;

pub use config::{CompletionThreshold, FlipConfig, Fling, ShadowColor, ShadowSpec, ShadowWidth};
pub use engine::{FlipFrame, MAX_PENDING_EVENTS, PageFlip, TouchSample};
pub use geometry::{CurlPoint, FoldGeometry, Region, compute_fold};
pub use layout::{Page, PageLayout, PageSide, SurfaceConfig};
pub use mesh::{CurlVertex, Mesh};
pub use policy::{FlipPolicy, Permissions};
pub use scroller::{Easing, Scroller};
pub use shadow::{ShadowRamp, ShadowStrips, ShadowVertex, Shadows, compute_shadows};
pub use state::{EndKind, FlipDirection, FlipEvent, FlipState};
pub use texture::{PageBitmap, PageTextures, PixelFormat, Slot, TextureError, TextureSlot, TextureUploader};
