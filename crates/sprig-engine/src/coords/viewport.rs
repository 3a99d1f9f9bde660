/// Output surface size in pixels.
///
/// The vertex stage maps pixel positions to clip space with the half-size
/// returned by [`Viewport::half_size`]. A stale viewport does not error; it
/// misplaces every sprite, so callers must push a new one on every resize.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_physical(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Scale uniforms: `(width / 2, height / 2)`, floored at half a pixel.
    #[inline]
    pub fn half_size(self) -> [f32; 2] {
        [self.width.max(1.0) * 0.5, self.height.max(1.0) * 0.5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_size_halves_dimensions() {
        assert_eq!(Viewport::new(800.0, 600.0).half_size(), [400.0, 300.0]);
    }

    #[test]
    fn half_size_of_degenerate_viewport_stays_positive() {
        assert_eq!(Viewport::new(0.0, 0.0).half_size(), [0.5, 0.5]);
        assert!(!Viewport::new(0.0, 10.0).is_valid());
    }
}
