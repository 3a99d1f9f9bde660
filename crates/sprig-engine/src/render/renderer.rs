use image::RgbaImage;

use crate::config::RendererConfig;
use crate::coords::PixelRect;
use crate::error::Result;
use crate::sprite::{FlushStats, Sprite, SpriteBatch, Tint};

use super::atlas::AtlasTexture;
use super::pipeline::SpritePipeline;
use super::{RenderCtx, RenderTarget};

/// Immediate-mode sprite renderer.
///
/// Queue sprites with [`draw`](Self::draw) / [`draw_rect`](Self::draw_rect)
/// during a frame, then call [`flush`](Self::flush) once: the queued records
/// are uploaded and replayed by a single instanced draw, in submission order.
///
/// All methods must be called from the thread that owns the wgpu device.
/// Instances are independent; several can share one device.
pub struct SpriteRenderer {
    batch: SpriteBatch,
    pipeline: SpritePipeline,
    atlas: AtlasTexture,
}

impl SpriteRenderer {
    /// Allocates the command buffer and GPU objects and binds the initial atlas.
    ///
    /// Without `atlas`, a 1x1 white atlas is installed so untextured rects
    /// render immediately.
    pub fn setup(
        ctx: &RenderCtx<'_>,
        config: RendererConfig,
        atlas: Option<&RgbaImage>,
    ) -> Result<Self> {
        let pipeline = SpritePipeline::new(ctx, &config)?;
        let atlas = match atlas {
            Some(image) => AtlasTexture::upload(ctx, pipeline.atlas_layout(), pipeline.sampler(), image)?,
            None => AtlasTexture::white(ctx, pipeline.atlas_layout(), pipeline.sampler())?,
        };

        let mut batch = SpriteBatch::new(&config);
        let [w, h] = atlas.size();
        batch.set_atlas_size(w, h);

        let mut renderer = Self { batch, pipeline, atlas };
        renderer.resize(ctx);
        Ok(renderer)
    }

    /// Replaces the atlas. Safe to call between any two frames.
    ///
    /// On error the previous atlas stays bound.
    pub fn load_atlas(&mut self, ctx: &RenderCtx<'_>, image: &RgbaImage) -> Result<()> {
        self.atlas = AtlasTexture::upload(
            ctx,
            self.pipeline.atlas_layout(),
            self.pipeline.sampler(),
            image,
        )?;
        let [w, h] = self.atlas.size();
        let uniforms = self.batch.set_atlas_size(w, h);
        self.pipeline.write_uniforms(ctx.queue, &uniforms);
        Ok(())
    }

    /// Queues one sprite. Fails only when the frame is at capacity.
    #[inline]
    pub fn draw(&mut self, sprite: Sprite) -> Result<usize> {
        self.batch.draw(sprite)
    }

    /// Queues an untextured rectangle.
    #[inline]
    pub fn draw_rect(&mut self, dst: PixelRect, tint: Tint, rotation: f32) -> Result<usize> {
        self.batch.draw_rect(dst, tint, rotation)
    }

    /// Clears `target`, draws every queued sprite with one instanced call and
    /// resets the frame.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> FlushStats {
        let mut sink = self.pipeline.sink(ctx.queue, target, &self.atlas);
        self.batch.flush_into(&mut sink)
    }

    /// Drops the queued sprites when the frame could not be presented.
    ///
    /// Nothing is uploaded or drawn; the next frame starts empty.
    #[inline]
    pub fn discard_frame(&mut self) -> usize {
        self.batch.discard()
    }

    /// Re-reads the surface size from `ctx` and updates the scale uniforms.
    ///
    /// Must be called whenever the surface is resized; nothing is re-created.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>) {
        let uniforms = self.batch.resize(ctx.viewport);
        self.pipeline.write_uniforms(ctx.queue, &uniforms);
        log::debug!(
            "sprite viewport {}x{}",
            ctx.viewport.width,
            ctx.viewport.height
        );
    }

    #[inline]
    pub fn batch(&self) -> &SpriteBatch {
        &self.batch
    }

    #[inline]
    pub fn atlas(&self) -> &AtlasTexture {
        &self.atlas
    }
}
