use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{Result, SpriteError};

use super::RenderCtx;

/// The shared sprite atlas on the GPU.
///
/// RGBA8 sRGB texture with a full mip chain, sampled with nearest filtering.
/// Replacing the atlas builds a new `AtlasTexture`; the old texture is
/// released when it is dropped.
pub struct AtlasTexture {
    // Kept alive for the bind group.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: [u32; 2],
    mip_levels: u32,
}

impl AtlasTexture {
    /// Uploads `image` and every mip level derived from it.
    pub fn upload(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &RgbaImage,
    ) -> Result<Self> {
        let (width, height) = image.dimensions();
        let max = ctx.max_texture_dimension();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(SpriteError::AtlasDimensions { width, height, max });
        }

        let levels = mip_chain(image);
        let mip_levels = levels.len() as u32 + 1;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sprig atlas texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_level(ctx.queue, &texture, 0, image);
        for (i, level) in levels.iter().enumerate() {
            write_level(ctx.queue, &texture, i as u32 + 1, level);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprig atlas bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("atlas uploaded: {width}x{height}, {mip_levels} mip levels");

        Ok(Self {
            _texture: texture,
            bind_group,
            size: [width, height],
            mip_levels,
        })
    }

    /// 1x1 opaque white atlas, used until real art is loaded.
    pub fn white(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Result<Self> {
        Self::upload(ctx, layout, sampler, &RgbaImage::from_pixel(1, 1, image::Rgba([255; 4])))
    }

    #[inline]
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    #[inline]
    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub(super) fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprig atlas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub(super) fn sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprig atlas sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        })
    }
}

/// Number of mip levels for a `width x height` base level, base included.
#[inline]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Levels 1.. of the mip chain; level 0 is `base` itself.
///
/// Each level halves the previous one (floored, never below 1).
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let (w, h) = base.dimensions();
    let count = mip_level_count(w, h);
    let mut levels: Vec<RgbaImage> = Vec::with_capacity(count.saturating_sub(1) as usize);

    for level in 1..count {
        let lw = (w >> level).max(1);
        let lh = (h >> level).max(1);
        let prev = levels.last().unwrap_or(base);
        let next = image::imageops::resize(prev, lw, lh, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, img: &RgbaImage) {
    let (width, height) = img.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        img.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_count_follows_longest_edge() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(8, 4), 4);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(300, 17), 9);
    }

    #[test]
    fn chain_halves_down_to_one_texel() {
        let base = RgbaImage::new(8, 3);
        let sizes: Vec<(u32, u32)> = mip_chain(&base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, [(4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn single_texel_has_no_extra_levels() {
        assert!(mip_chain(&RgbaImage::new(1, 1)).is_empty());
    }

    #[test]
    fn uniform_colour_survives_downsampling() {
        let base = RgbaImage::from_pixel(16, 16, image::Rgba([255, 255, 255, 255]));
        for level in mip_chain(&base) {
            assert!(level.pixels().all(|p| p.0.iter().all(|c| *c >= 254)));
        }
    }
}
