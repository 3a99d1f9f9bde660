//! GPU half of the sprite renderer.
//!
//! `SpriteRenderer` pairs the host-side `sprite::SpriteBatch` with the wgpu
//! objects that replay it: one pipeline, one fixed-size instance buffer, one
//! atlas texture.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using the viewport half-size uniform.

mod atlas;
mod ctx;
mod pipeline;
mod renderer;

pub use atlas::{mip_chain, mip_level_count, AtlasTexture};
pub use ctx::{RenderCtx, RenderTarget};
pub use pipeline::{SpritePipeline, WgpuFrameSink};
pub use renderer::SpriteRenderer;
