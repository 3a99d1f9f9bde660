/// Frame-loop policy after `get_current_texture` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated; the surface was configured again at its current size.
    Reconfigured,
    /// Timeout or unspecified; this frame is dropped, queued sprites stay queued.
    SkipFrame,
    /// Out of memory. The window's loop should stop.
    Fatal,
}

impl SurfaceErrorAction {
    #[inline]
    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}
