//! Coordinate and geometry types shared by the sprite path and the runtime.
//!
//! Canonical CPU space:
//! - Pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The vertex shader converts to NDC using the viewport half-size uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::PixelRect;
pub use vec2::Vec2;
pub use viewport::Viewport;
