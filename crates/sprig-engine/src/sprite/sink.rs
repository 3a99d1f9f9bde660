/// Destination of a flushed frame.
///
/// A flush performs exactly one `upload` (skipped when the frame is empty)
/// followed by exactly one `draw`. The wgpu implementation lives in
/// `render::pipeline`; tests record the calls instead.
pub trait FrameSink {
    /// Receives the used prefix of the command buffer, `pending * 24` bytes.
    fn upload(&mut self, bytes: &[u8]);

    /// Clears the whole target to `clear`, then replays the shared quad once
    /// per instance.
    fn draw(&mut self, clear: wgpu::Color, instances: u32);
}

/// What a flush submitted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub instances: u32,
    pub bytes_uploaded: usize,
}
