use std::path::PathBuf;

/// Errors surfaced by the sprite renderer.
///
/// Only [`SpriteError::CapacityExceeded`] can come out of the per-sprite hot
/// path. Everything else is raised while setting up the renderer or while
/// getting atlas pixels onto the GPU.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    /// The frame already holds `capacity` sprites; flush before drawing more.
    #[error("sprite capacity exceeded ({capacity} sprites per frame)")]
    CapacityExceeded { capacity: usize },

    /// GPU-side resources could not be created. The renderer must not be used.
    #[error("renderer initialization failed: {0}")]
    ResourceInit(String),

    /// The atlas image could not be read or decoded.
    #[error("failed to decode atlas {path:?}")]
    AtlasDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The atlas does not fit the device's 2D texture limit.
    #[error("atlas is {width}x{height}, device maximum is {max}")]
    AtlasDimensions { width: u32, height: u32, max: u32 },

    /// The background loader went away without reporting a result.
    #[error("atlas loader terminated without a result")]
    AtlasLoaderGone,
}

pub type Result<T, E = SpriteError> = std::result::Result<T, E>;
