//! Sprig engine crate.
//!
//! An immediate-mode sprite renderer over a retained GPU draw path: every
//! frame, callers queue sprites cut from one shared atlas, and a flush renders
//! all of them with a single instanced draw call. The platform pieces
//! (window, device, frame loop) live alongside for hosting it.

pub mod assets;
pub mod config;
pub mod coords;
pub mod error;
pub mod render;
pub mod sprite;

pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;

pub use config::RendererConfig;
pub use coords::PixelRect;
pub use error::SpriteError;
pub use render::SpriteRenderer;
pub use sprite::{Sprite, Tint};
