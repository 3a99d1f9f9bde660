/// Integer rectangle in pixels (top-left origin, +Y down).
///
/// Used both for atlas source regions and for sprite destinations. Values are
/// kept as `i32` on the API side and narrowed to `i16` when packed into a
/// sprite record.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    /// The atlas texel reserved for untextured rectangles.
    ///
    /// Atlases are expected to keep texel (0, 0) opaque white.
    pub const WHITE_TEXEL: PixelRect = PixelRect::new(0, 0, 1, 1);

    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn from_pos_size(pos: [i32; 2], size: [i32; 2]) -> Self {
        Self::new(pos[0], pos[1], size[0], size[1])
    }

    /// True when every field survives narrowing to `i16` unchanged.
    #[inline]
    pub fn fits_i16(self) -> bool {
        [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| i16::try_from(*v).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_texel_is_unit_rect_at_origin() {
        let r = PixelRect::WHITE_TEXEL;
        assert_eq!(r, PixelRect::from_pos_size([0, 0], [1, 1]));
    }

    #[test]
    fn fits_i16_bounds() {
        assert!(PixelRect::new(-32768, 32767, 0, 1).fits_i16());
        assert!(!PixelRect::new(32768, 0, 1, 1).fits_i16());
        assert!(!PixelRect::new(0, 0, 1, -40000).fits_i16());
    }

    #[test]
    fn from_pos_size_round_trips_fields() {
        let r = PixelRect::from_pos_size([3, 4], [5, 6]);
        assert_eq!(r, PixelRect::new(3, 4, 5, 6));
    }
}
