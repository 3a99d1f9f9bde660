use bytemuck::{Pod, Zeroable};

use crate::config::RendererConfig;
use crate::coords::{PixelRect, Viewport};
use crate::error::{Result, SpriteError};

use super::buffer::CommandBuffer;
use super::sink::{FlushStats, FrameSink};
use super::tint::Tint;

/// One sprite draw request.
///
/// `src` is a pixel rect inside the atlas, `dst` the destination rect on the
/// surface. Coordinates are narrowed to `i16` when queued; debug builds assert
/// they fit, release builds truncate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub src: PixelRect,
    pub dst: PixelRect,
    pub tint: Tint,
    pub rotation: f32,
}

impl Sprite {
    #[inline]
    pub fn new(src: PixelRect, pos: [i32; 2], size: [i32; 2]) -> Self {
        Self {
            src,
            dst: PixelRect::from_pos_size(pos, size),
            tint: Tint::DEFAULT,
            rotation: 0.0,
        }
    }

    /// Untextured rectangle sampling the reserved white texel.
    #[inline]
    pub fn rect(dst: PixelRect) -> Self {
        Self {
            src: PixelRect::WHITE_TEXEL,
            dst,
            tint: Tint::DEFAULT,
            rotation: 0.0,
        }
    }

    #[inline]
    pub fn tint(mut self, tint: Tint) -> Self {
        self.tint = tint;
        self
    }

    /// Rotation about the sprite's own center, in radians.
    #[inline]
    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }
}

/// Uniform block shared by both shader stages.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    /// `(width / 2, height / 2)` of the output surface.
    pub half_viewport: [f32; 2],
    /// Atlas size in texels.
    pub atlas_size: [f32; 2],
}

/// GPU-free half of the sprite renderer.
///
/// Owns the command buffer, the frame counter and the uniform state, and
/// drives a [`FrameSink`] on flush. `render::SpriteRenderer` pairs it with the
/// wgpu resources.
pub struct SpriteBatch {
    commands: CommandBuffer,
    viewport: Viewport,
    atlas_size: [u32; 2],
    clear_color: wgpu::Color,
    warned_capacity: bool,
}

impl SpriteBatch {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            commands: CommandBuffer::new(config.capacity),
            viewport: Viewport::new(1.0, 1.0),
            atlas_size: [1, 1],
            clear_color: config.clear_color,
            warned_capacity: false,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.commands.pending()
    }

    #[inline]
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn atlas_size(&self) -> [u32; 2] {
        self.atlas_size
    }

    /// Queues one sprite; returns its slot (= its z-order within the frame).
    pub fn draw(&mut self, sprite: Sprite) -> Result<usize> {
        let Sprite { src, dst, tint, rotation } = sprite;
        debug_assert!(
            dst.fits_i16() && src.fits_i16(),
            "sprite rect {dst:?} / {src:?} does not fit in i16"
        );
        let pushed = self.commands.push(
            [narrow(dst.x), narrow(dst.y)],
            [narrow(dst.w), narrow(dst.h)],
            [narrow(src.x), narrow(src.y), narrow(src.w), narrow(src.h)],
            tint.packed(),
            rotation,
        );

        if let Err(SpriteError::CapacityExceeded { capacity }) = &pushed {
            if !self.warned_capacity {
                log::warn!("sprite capacity of {capacity} reached; further draws this frame are refused");
                self.warned_capacity = true;
            }
        }
        pushed
    }

    /// Queues an untextured rectangle (atlas rect fixed to the white texel).
    pub fn draw_rect(&mut self, dst: PixelRect, tint: Tint, rotation: f32) -> Result<usize> {
        self.draw(Sprite::rect(dst).tint(tint).rotation(rotation))
    }

    /// Records a new surface size and returns the uniforms to upload.
    ///
    /// Degenerate sizes (a minimized window) keep the previous viewport.
    pub fn resize(&mut self, viewport: Viewport) -> SpriteUniforms {
        if viewport.is_valid() {
            self.viewport = viewport;
        } else {
            log::debug!("ignoring degenerate viewport {}x{}", viewport.width, viewport.height);
        }
        self.uniforms()
    }

    /// Records a new atlas size and returns the uniforms to upload.
    pub fn set_atlas_size(&mut self, width: u32, height: u32) -> SpriteUniforms {
        self.atlas_size = [width.max(1), height.max(1)];
        self.uniforms()
    }

    pub fn uniforms(&self) -> SpriteUniforms {
        SpriteUniforms {
            half_viewport: self.viewport.half_size(),
            atlas_size: [self.atlas_size[0] as f32, self.atlas_size[1] as f32],
        }
    }

    /// Uploads the queued prefix, issues the single instanced draw and starts
    /// a new frame.
    pub fn flush_into<S: FrameSink>(&mut self, sink: &mut S) -> FlushStats {
        let bytes = self.commands.used_bytes();
        let stats = FlushStats {
            instances: self.commands.pending() as u32,
            bytes_uploaded: bytes.len(),
        };

        if !bytes.is_empty() {
            sink.upload(bytes);
        }
        sink.draw(self.clear_color, stats.instances);

        self.start_frame();
        log::trace!(
            "flushed {} sprites ({} bytes)",
            stats.instances,
            stats.bytes_uploaded
        );
        stats
    }

    /// Drops everything queued this frame without drawing it.
    ///
    /// For frames where no render target could be acquired; returns the
    /// number of sprites dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.start_frame();
        if dropped > 0 {
            log::debug!("discarded {dropped} queued sprites");
        }
        dropped
    }

    fn start_frame(&mut self) -> usize {
        self.warned_capacity = false;
        self.commands.reset()
    }
}

// Range is checked in debug builds by `SpriteBatch::draw`.
#[inline]
fn narrow(v: i32) -> i16 {
    v as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::math::record_corners;

    #[derive(Default)]
    struct RecordingSink {
        uploads: Vec<Vec<u8>>,
        draws: Vec<u32>,
        clears: usize,
    }

    impl FrameSink for RecordingSink {
        fn upload(&mut self, bytes: &[u8]) {
            self.uploads.push(bytes.to_vec());
        }

        fn draw(&mut self, _clear: wgpu::Color, instances: u32) {
            self.clears += 1;
            self.draws.push(instances);
        }
    }

    fn batch(capacity: usize) -> SpriteBatch {
        SpriteBatch::new(&RendererConfig::default().with_capacity(capacity))
    }

    fn sprite(x: i32) -> Sprite {
        Sprite::new(PixelRect::new(8, 8, 16, 16), [x, 0], [16, 16])
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_returns_submission_order() {
        let mut b = batch(4);
        assert_eq!(b.draw(sprite(0)).unwrap(), 0);
        assert_eq!(b.draw(sprite(1)).unwrap(), 1);
        assert_eq!(b.draw(sprite(2)).unwrap(), 2);
        let xs: Vec<i16> = (0..3)
            .map(|i| b.commands().record(i).unwrap().draw_pos[0])
            .collect();
        assert_eq!(xs, [0, 1, 2]);
    }

    #[test]
    fn draw_defaults_to_identity_tint_and_no_rotation() {
        let mut b = batch(1);
        b.draw(sprite(0)).unwrap();
        let rec = b.commands().record(0).unwrap();
        assert_eq!(rec.tint(), Tint::DEFAULT);
        assert_eq!(rec.rotation, 0.0);
        assert_eq!(rec.tex_rect, [8, 8, 16, 16]);
    }

    #[test]
    fn draw_rect_samples_white_texel() {
        let mut b = batch(1);
        b.draw_rect(PixelRect::new(5, 6, 7, 8), Tint::rgb(1, 2, 3), 0.5)
            .unwrap();
        let rec = b.commands().record(0).unwrap();
        assert_eq!(rec.tex_rect, [0, 0, 1, 1]);
        assert_eq!(rec.draw_pos, [5, 6]);
        assert_eq!(rec.draw_size, [7, 8]);
        assert_eq!(rec.tint(), Tint::rgb(1, 2, 3));
        assert_eq!(rec.rotation, 0.5);
    }

    #[test]
    fn rotated_record_keeps_center() {
        let mut b = batch(1);
        b.draw(sprite(100).rotation(0.8)).unwrap();
        let c = record_corners(b.commands().record(0).unwrap());
        let cx = (c[0].x + c[1].x + c[2].x + c[3].x) / 4.0;
        let cy = (c[0].y + c[1].y + c[2].y + c[3].y) / 4.0;
        approx::assert_abs_diff_eq!(cx, 108.0, epsilon = 1e-3);
        approx::assert_abs_diff_eq!(cy, 8.0, epsilon = 1e-3);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "does not fit in i16")]
    fn out_of_range_coordinate_asserts_in_debug() {
        let mut b = batch(1);
        let _ = b.draw(Sprite::new(PixelRect::WHITE_TEXEL, [40_000, 0], [1, 1]));
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn capacity_draws_then_flush_resets() {
        let mut b = batch(5);
        for i in 0..5 {
            b.draw(sprite(i)).unwrap();
        }
        assert!(matches!(
            b.draw(sprite(5)),
            Err(SpriteError::CapacityExceeded { capacity: 5 })
        ));

        let mut sink = RecordingSink::default();
        let stats = b.flush_into(&mut sink);
        assert_eq!(stats.instances, 5);
        assert_eq!(b.pending(), 0);
        assert!(b.draw(sprite(0)).is_ok());
    }

    #[test]
    fn capacity_warning_rearms_each_frame() {
        let mut b = batch(1);
        let mut sink = RecordingSink::default();

        b.draw(sprite(0)).unwrap();
        assert!(b.draw(sprite(1)).is_err());
        assert!(b.warned_capacity);

        b.flush_into(&mut sink);
        assert!(!b.warned_capacity);

        b.draw(sprite(2)).unwrap();
        assert!(b.draw(sprite(3)).is_err());
        assert!(b.warned_capacity);
    }

    // ── discard ───────────────────────────────────────────────────────────

    #[test]
    fn discard_drops_a_full_frame_so_the_next_fills_again() {
        let mut b = batch(2);
        b.draw(sprite(1)).unwrap();
        b.draw(sprite(2)).unwrap();
        assert!(b.draw(sprite(3)).is_err());

        // No target this frame.
        assert_eq!(b.discard(), 2);
        assert_eq!(b.pending(), 0);
        assert!(!b.warned_capacity);

        b.draw(sprite(7)).unwrap();
        let mut sink = RecordingSink::default();
        let stats = b.flush_into(&mut sink);
        assert_eq!(stats.instances, 1);
        assert_eq!(i16::from_le_bytes([sink.uploads[0][0], sink.uploads[0][1]]), 7);
    }

    #[test]
    fn discard_on_empty_frame_is_a_no_op() {
        let mut b = batch(2);
        assert_eq!(b.discard(), 0);
        assert_eq!(b.pending(), 0);
    }

    // ── flush ─────────────────────────────────────────────────────────────

    #[test]
    fn flush_uploads_only_used_prefix() {
        let mut b = batch(1000);
        for i in 0..7 {
            b.draw(sprite(i)).unwrap();
        }
        let mut sink = RecordingSink::default();
        let stats = b.flush_into(&mut sink);
        assert_eq!(stats.bytes_uploaded, 7 * 24);
        assert_eq!(sink.uploads.len(), 1);
        assert_eq!(sink.uploads[0].len(), 168);
    }

    #[test]
    fn empty_flush_still_clears_without_upload() {
        let mut b = batch(8);
        let mut sink = RecordingSink::default();
        let stats = b.flush_into(&mut sink);
        assert_eq!(stats, FlushStats::default());
        assert!(sink.uploads.is_empty());
        assert_eq!(sink.draws, [0]);
        assert_eq!(sink.clears, 1);
    }

    #[test]
    fn end_to_end_two_frames() {
        let mut b = batch(3);
        let mut sink = RecordingSink::default();

        b.draw(sprite(1)).unwrap();
        b.draw(sprite(2)).unwrap();
        b.draw(sprite(3)).unwrap();
        let first = b.flush_into(&mut sink);
        assert_eq!(first, FlushStats { instances: 3, bytes_uploaded: 72 });

        b.draw(sprite(4).tint(Tint::rgb(9, 9, 9))).unwrap();
        let second = b.flush_into(&mut sink);
        assert_eq!(second, FlushStats { instances: 1, bytes_uploaded: 24 });

        assert_eq!(sink.draws, [3, 1]);
        assert_eq!(sink.uploads[1].len(), 24);
        // The second frame carries only the new sprite, not leftovers.
        assert_eq!(i16::from_le_bytes([sink.uploads[1][0], sink.uploads[1][1]]), 4);
        assert_eq!(&sink.uploads[1][16..20], &Tint::rgb(9, 9, 9).to_bytes());
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn resize_changes_scale_uniforms_only() {
        let mut b = batch(2);
        b.set_atlas_size(512, 256);
        b.draw(sprite(0)).unwrap();

        let a = b.resize(Viewport::new(800.0, 600.0));
        let c = b.resize(Viewport::new(1024.0, 768.0));
        assert_eq!(a.half_viewport, [400.0, 300.0]);
        assert_eq!(c.half_viewport, [512.0, 384.0]);
        assert_ne!(a, c);
        assert_eq!(a.atlas_size, c.atlas_size);

        // Pending work and capacity survive a resize.
        assert_eq!(b.pending(), 1);
        assert_eq!(b.capacity(), 2);
    }

    #[test]
    fn degenerate_resize_keeps_last_viewport() {
        let mut b = batch(1);
        b.resize(Viewport::new(640.0, 480.0));
        let u = b.resize(Viewport::new(0.0, 480.0));
        assert_eq!(u.half_viewport, [320.0, 240.0]);
        assert_eq!(b.viewport(), Viewport::new(640.0, 480.0));
    }

    #[test]
    fn uniform_block_is_16_bytes() {
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 16);
        let u = batch(1).set_atlas_size(0, 64);
        assert_eq!(u.atlas_size, [1.0, 64.0]);
    }
}
