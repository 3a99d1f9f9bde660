use bytemuck::{Pod, Zeroable};

use super::tint::Tint;

/// One queued sprite, exactly as the GPU fetches it.
///
/// Byte layout (stride 24):
///
/// | offset | type      | field                    |
/// |--------|-----------|--------------------------|
/// | 0      | `i16 x 2` | draw position            |
/// | 4      | `i16 x 2` | draw size                |
/// | 8      | `i16 x 4` | atlas rect (x, y, w, h)  |
/// | 16     | `u8 x 4`  | tint (a, b, g, r)        |
/// | 20     | `f32`     | rotation in radians      |
///
/// `tint` is held as its little-endian packed `u32` so the record stays
/// 4-byte aligned and castable to `u32`/`f32` views.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteRecord {
    pub draw_pos: [i16; 2],
    pub draw_size: [i16; 2],
    pub tex_rect: [i16; 4],
    pub tint: u32,
    pub rotation: f32,
}

pub const RECORD_SIZE: usize = 24;

pub const DRAW_POS_OFFSET: usize = 0;
pub const DRAW_SIZE_OFFSET: usize = 4;
pub const TEX_RECT_OFFSET: usize = 8;
pub const TINT_OFFSET: usize = 16;
pub const ROTATION_OFFSET: usize = 20;

/// `i16` slots per record in the narrow view; the first 8 are live fields.
pub const NARROW_PER_RECORD: usize = RECORD_SIZE / 2;
/// Number of `i16` fields at the start of a record.
pub const NARROW_FIELDS: usize = 8;
/// 32-bit slots per record in the packed / float views.
pub const WORDS_PER_RECORD: usize = RECORD_SIZE / 4;
/// Index of the tint word within a record's 32-bit slots.
pub const TINT_WORD: usize = TINT_OFFSET / 4;
/// Index of the rotation word within a record's 32-bit slots.
pub const ROTATION_WORD: usize = ROTATION_OFFSET / 4;

const _: () = assert!(std::mem::size_of::<SpriteRecord>() == RECORD_SIZE);
const _: () = assert!(std::mem::align_of::<SpriteRecord>() == 4);

impl SpriteRecord {
    #[inline]
    pub fn tint(&self) -> Tint {
        Tint::from_packed(self.tint)
    }

    /// Shader locations 1..=5; location 0 is the per-vertex corner multiplier.
    const ATTRS: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Sint16x2,
            offset: DRAW_POS_OFFSET as u64,
            shader_location: 1,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Sint16x2,
            offset: DRAW_SIZE_OFFSET as u64,
            shader_location: 2,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Sint16x4,
            offset: TEX_RECT_OFFSET as u64,
            shader_location: 3,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Uint8x4,
            offset: TINT_OFFSET as u64,
            shader_location: 4,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32,
            offset: ROTATION_OFFSET as u64,
            shader_location: 5,
        },
    ];

    /// Instance-rate layout: one record consumed per sprite.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: RECORD_SIZE as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpriteRecord {
        SpriteRecord {
            draw_pos: [-1, 2],
            draw_size: [3, 4],
            tex_rect: [5, 6, 7, 8],
            tint: Tint::rgba(0xAA, 0xBB, 0xCC, 0xDD).packed(),
            rotation: 1.5,
        }
    }

    #[test]
    fn byte_offsets_match_wire_layout() {
        let rec = sample();
        let bytes = bytemuck::bytes_of(&rec);
        assert_eq!(bytes.len(), 24);

        let i16_at = |o: usize| i16::from_le_bytes([bytes[o], bytes[o + 1]]);
        let fields: Vec<i16> = (0..8).map(|i| i16_at(i * 2)).collect();
        assert_eq!(fields, [-1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(&bytes[16..20], &[0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(f32::from_le_bytes(bytes[20..24].try_into().unwrap()), 1.5);
    }

    #[test]
    fn layout_covers_whole_stride_without_overlap() {
        let layout = SpriteRecord::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);

        let mut end = 0;
        for attr in layout.attributes {
            assert_eq!(attr.offset, end, "attribute {} leaves a gap", attr.shader_location);
            end = attr.offset + attr.format.size();
        }
        assert_eq!(end, 24);
    }

    #[test]
    fn tint_accessor_unpacks() {
        assert_eq!(sample().tint(), Tint::rgba(0xAA, 0xBB, 0xCC, 0xDD));
    }
}
