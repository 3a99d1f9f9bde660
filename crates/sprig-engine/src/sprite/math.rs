//! Host-side mirror of the sprite vertex stage.
//!
//! `shaders/sprite.wgsl` is the source of truth at draw time; these functions
//! perform the same arithmetic so placement, clip mapping and atlas lookup
//! can be checked without a GPU.

use crate::coords::Vec2;

use super::record::SpriteRecord;

/// Corner multipliers shared by every sprite instance.
pub const CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
];

/// Two triangles over [`CORNERS`] sharing the (0,1)-(1,0) diagonal.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

/// Screen position of corner `m` of a sprite.
///
/// Rotation is about the sprite's own center. A rotation of exactly zero
/// takes the trig-free path.
#[inline]
pub fn corner_position(draw_pos: Vec2, draw_size: Vec2, rotation: f32, m: Vec2) -> Vec2 {
    if rotation == 0.0 {
        return draw_pos + draw_size.scale(m);
    }
    let offset = draw_size.scale(m - Vec2::splat(0.5));
    draw_pos + offset.rotated(rotation) + draw_size * 0.5
}

/// All four corners of a queued record, in [`CORNERS`] order.
pub fn record_corners(rec: &SpriteRecord) -> [Vec2; 4] {
    let pos = Vec2::from_i16(rec.draw_pos);
    let size = Vec2::from_i16(rec.draw_size);
    CORNERS.map(|m| corner_position(pos, size, rec.rotation, m))
}

/// Pixel position to NDC, flipping Y.
#[inline]
pub fn to_ndc(p: Vec2, half_viewport: [f32; 2]) -> Vec2 {
    Vec2::new(p.x / half_viewport[0] - 1.0, 1.0 - p.y / half_viewport[1])
}

/// Normalized atlas coordinate for corner `m` of `tex_rect`.
#[inline]
pub fn atlas_uv(tex_rect: [i16; 4], atlas_size: [f32; 2], m: Vec2) -> Vec2 {
    let origin = Vec2::new(f32::from(tex_rect[0]), f32::from(tex_rect[1]));
    let extent = Vec2::new(f32::from(tex_rect[2]), f32::from(tex_rect[3]));
    let texel = origin + extent.scale(m);
    Vec2::new(texel.x / atlas_size[0], texel.y / atlas_size[1])
}
