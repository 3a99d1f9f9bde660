use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use image::RgbaImage;

use crate::error::{Result, SpriteError};

/// Decodes atlas images off the render thread.
///
/// Decoding happens on a worker thread; the result is handed back once
/// through a [`PendingAtlas`]. Installing the pixels stays on the render
/// thread via `SpriteRenderer::load_atlas`.
pub struct AtlasLoader;

impl AtlasLoader {
    /// Starts decoding `path` in the background.
    pub fn spawn(path: impl Into<PathBuf>) -> PendingAtlas {
        let path = path.into();
        let (tx, rx) = mpsc::sync_channel(1);
        let worker_path = path.clone();

        let spawned = thread::Builder::new()
            .name("sprig-atlas-loader".into())
            .spawn(move || {
                // The receiver may already be gone; nothing to report then.
                let _ = tx.send(Self::load(&worker_path));
            });

        if let Err(e) = spawned {
            log::error!("failed to spawn atlas loader thread: {e}");
        }

        PendingAtlas { path, rx: Some(rx) }
    }

    /// Decodes `path` on the calling thread.
    pub fn load(path: &Path) -> Result<RgbaImage> {
        let image = image::open(path).map_err(|source| SpriteError::AtlasDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        log::debug!(
            "decoded atlas {}: {}x{}",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(rgba)
    }
}

/// Single-shot completion handle for a background atlas decode.
pub struct PendingAtlas {
    path: PathBuf,
    rx: Option<Receiver<Result<RgbaImage>>>,
}

impl PendingAtlas {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the result has been taken.
    pub fn is_done(&self) -> bool {
        self.rx.is_none()
    }

    /// Non-blocking check, meant to be called once per frame.
    ///
    /// Yields the result exactly once; afterwards always `None`.
    pub fn poll(&mut self) -> Option<Result<RgbaImage>> {
        let outcome = match self.rx.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SpriteError::AtlasLoaderGone),
        };
        self.rx = None;
        Some(outcome)
    }

    /// Blocks until the decode finishes.
    pub fn wait(mut self) -> Result<RgbaImage> {
        match self.rx.take() {
            Some(rx) => rx.recv().unwrap_or(Err(SpriteError::AtlasLoaderGone)),
            None => Err(SpriteError::AtlasLoaderGone),
        }
    }
}
