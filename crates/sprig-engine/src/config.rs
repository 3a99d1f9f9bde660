/// Renderer configuration, fixed for the lifetime of a renderer.
///
/// Keep this structure small. Capacity sizes both the host command buffer and
/// the GPU instance buffer; changing it means building a new renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Maximum sprites per frame.
    pub capacity: usize,

    /// Whole-surface clear applied by every flush.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            capacity: 65_536,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl RendererConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_clear_color(mut self, clear_color: wgpu::Color) -> Self {
        self.clear_color = clear_color;
        self
    }
}
