/// Packed per-sprite tint.
///
/// Four bytes stored in `a, b, g, r` order so that the little-endian `u32`
/// view of a sprite record and its byte view agree. The `a` byte doubles as a
/// brightness exponent:
///
/// - `a <= 127`: straight opacity, `a / 127`.
/// - `a > 127`: fully opaque, colour scaled by `2^((a - 127) / 16)`, i.e. one
///   doubling of brightness every 16 steps above opaque.
///
/// The decode itself runs in the fragment stage; [`Tint::decode`] mirrors it
/// on the CPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Tint {
    pub a: u8,
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

/// `a` value meaning "fully opaque, unmodified brightness".
pub const OPAQUE: u8 = 127;

/// Steps of `a` above [`OPAQUE`] per doubling of brightness.
pub const STEPS_PER_DOUBLING: f32 = 16.0;

impl Tint {
    /// No tint, full opacity.
    pub const DEFAULT: Tint = Tint::rgba(255, 255, 255, OPAQUE);

    pub const WHITE: Tint = Tint::DEFAULT;

    /// Creates a tint from colour bytes and a raw `a` code.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { a, b, g, r }
    }

    /// Opaque colour tint.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, OPAQUE)
    }

    /// Sets opacity from `[0, 1]`, mapped onto `0..=127`.
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * f32::from(OPAQUE)).round() as u8;
        Self { a, ..self }
    }

    /// Makes the tint opaque and `2^doublings` times brighter than the source.
    ///
    /// Quantized to 1/16 of a doubling; saturates at `a = 255` (8 doublings).
    #[inline]
    pub fn brightened(self, doublings: f32) -> Self {
        let steps = (doublings.max(0.0) * STEPS_PER_DOUBLING).round();
        let a = (f32::from(OPAQUE) + steps).min(255.0) as u8;
        Self { a, ..self }
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.a, self.b, self.g, self.r]
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self { a: bytes[0], b: bytes[1], g: bytes[2], r: bytes[3] }
    }

    /// Value written through the packed 32-bit view of a sprite record.
    #[inline]
    pub const fn packed(self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }

    #[inline]
    pub const fn from_packed(v: u32) -> Self {
        Self::from_bytes(v.to_le_bytes())
    }

    #[inline]
    pub const fn is_brightened(self) -> bool {
        self.a > OPAQUE
    }

    /// CPU mirror of the fragment-stage decode.
    pub fn decode(self) -> TintMultiplier {
        let rgb = [f32::from(self.r), f32::from(self.g), f32::from(self.b)];
        if !self.is_brightened() {
            let alpha = f32::from(self.a) / f32::from(OPAQUE);
            TintMultiplier {
                rgb: rgb.map(|c| c / 255.0 * alpha),
                alpha,
            }
        } else {
            let mult = color_mult(self.a);
            TintMultiplier {
                rgb: rgb.map(|c| c * mult),
                alpha: 1.0,
            }
        }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Brighten-mode scale factor applied to raw `0..=255` colour bytes.
#[inline]
pub fn color_mult(a: u8) -> f32 {
    ((f32::from(a) - f32::from(OPAQUE)) / STEPS_PER_DOUBLING).exp2() / 255.0
}

/// Decoded tint: premultiplied colour multiplier and alpha multiplier.
///
/// The fragment stage outputs `texel.rgb * texel.a * rgb` and `texel.a * alpha`
/// and blends premultiplied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TintMultiplier {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // ── byte order ────────────────────────────────────────────────────────

    #[test]
    fn bytes_are_a_b_g_r() {
        let t = Tint::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(t.to_bytes(), [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(t.packed(), 0x1122_3344);
        assert_eq!(Tint::from_packed(t.packed()), t);
    }

    #[test]
    fn default_is_opaque_white() {
        let t = Tint::default();
        assert_eq!((t.r, t.g, t.b, t.a), (255, 255, 255, 127));
    }

    // ── decode ────────────────────────────────────────────────────────────

    #[test]
    fn opaque_white_is_identity() {
        let m = Tint::DEFAULT.decode();
        for c in m.rgb {
            assert_abs_diff_eq!(c, 1.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(m.alpha, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_alpha_is_fully_transparent() {
        let m = Tint::rgba(255, 0, 0, 0).decode();
        assert_eq!(m.alpha, 0.0);
        assert_eq!(m.rgb, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn half_alpha_scales_colour_and_alpha() {
        let m = Tint::rgba(255, 255, 0, 63).decode();
        let expected = 63.0 / 127.0;
        assert_abs_diff_eq!(m.alpha, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(m.rgb[0], expected, epsilon = 1e-6);
        assert_abs_diff_eq!(m.rgb[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn one_doubling_above_opaque() {
        assert_abs_diff_eq!(color_mult(143), 2.0 / 255.0, epsilon = 1e-7);

        let m = Tint::rgba(255, 255, 255, 143).decode();
        assert_eq!(m.alpha, 1.0);
        for c in m.rgb {
            assert_abs_diff_eq!(c, 2.0, epsilon = 1e-5);
            assert!(c > Tint::DEFAULT.decode().rgb[0]);
        }
    }

    #[test]
    fn brighten_mode_boundary() {
        assert!(!Tint::rgba(0, 0, 0, 127).is_brightened());
        assert!(Tint::rgba(0, 0, 0, 128).is_brightened());
        // Just above opaque is marginally brighter than identity.
        let m = Tint::rgba(255, 255, 255, 128).decode();
        assert!(m.rgb[0] > 1.0 && m.rgb[0] < 1.05);
    }

    // ── constructors ──────────────────────────────────────────────────────

    #[test]
    fn with_opacity_maps_onto_0_127() {
        assert_eq!(Tint::WHITE.with_opacity(0.0).a, 0);
        assert_eq!(Tint::WHITE.with_opacity(1.0).a, 127);
        assert_eq!(Tint::WHITE.with_opacity(2.0).a, 127);
        assert_eq!(Tint::WHITE.with_opacity(0.5).a, 64);
    }

    #[test]
    fn brightened_quantizes_and_saturates() {
        assert_eq!(Tint::WHITE.brightened(1.0).a, 143);
        assert_eq!(Tint::WHITE.brightened(0.0).a, 127);
        assert_eq!(Tint::WHITE.brightened(100.0).a, 255);
    }
}
