//! Atlas image acquisition.
//!
//! Decoding is not part of the render path; this module turns files into
//! RGBA8 pixels, synchronously or on a worker thread.

mod loader;

pub use loader::{AtlasLoader, PendingAtlas};
