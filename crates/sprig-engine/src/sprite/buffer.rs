use crate::error::Result;

use super::frame::FrameCounter;
use super::record::{
    SpriteRecord, NARROW_FIELDS, NARROW_PER_RECORD, RECORD_SIZE, ROTATION_WORD, TINT_WORD,
    WORDS_PER_RECORD,
};

/// Fixed-capacity per-frame sprite storage.
///
/// One allocation of `capacity` [`SpriteRecord`]s, written through three
/// views cast over the same bytes:
///
/// - narrow (`i16`): position, size and atlas rect
/// - packed (`u32`): tint
/// - float (`f32`): rotation
///
/// Records past `pending()` are stale data from earlier frames and are never
/// uploaded. The buffer never grows; the GPU-side instance buffer is sized
/// from the same capacity at setup.
pub struct CommandBuffer {
    records: Box<[SpriteRecord]>,
    counter: FrameCounter,
}

impl CommandBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: vec![SpriteRecord::default(); capacity].into_boxed_slice(),
            counter: FrameCounter::new(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.counter.capacity()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.counter.pending()
    }

    /// Appends one record at the current slot and returns its index.
    ///
    /// Field ranges are not validated; only capacity is.
    pub fn push(
        &mut self,
        draw_pos: [i16; 2],
        draw_size: [i16; 2],
        tex_rect: [i16; 4],
        tint: u32,
        rotation: f32,
    ) -> Result<usize> {
        let slot = self.counter.claim()?;

        let n = slot * NARROW_PER_RECORD;
        let narrow: &mut [i16] = bytemuck::cast_slice_mut(&mut self.records[..]);
        narrow[n..n + NARROW_FIELDS].copy_from_slice(&[
            draw_pos[0],
            draw_pos[1],
            draw_size[0],
            draw_size[1],
            tex_rect[0],
            tex_rect[1],
            tex_rect[2],
            tex_rect[3],
        ]);

        let w = slot * WORDS_PER_RECORD;
        let packed: &mut [u32] = bytemuck::cast_slice_mut(&mut self.records[..]);
        packed[w + TINT_WORD] = tint;

        let float: &mut [f32] = bytemuck::cast_slice_mut(&mut self.records[..]);
        float[w + ROTATION_WORD] = rotation;

        Ok(slot)
    }

    /// Bytes of the records queued this frame: `pending * 24`.
    #[inline]
    pub fn used_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records[..self.counter.pending()])
    }

    #[inline]
    pub fn record(&self, slot: usize) -> Option<&SpriteRecord> {
        self.records[..self.counter.pending()].get(slot)
    }

    pub fn narrow_view(&self) -> &[i16] {
        bytemuck::cast_slice(&self.records[..])
    }

    pub fn packed_view(&self) -> &[u32] {
        bytemuck::cast_slice(&self.records[..])
    }

    pub fn float_view(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records[..])
    }

    /// Size of the whole backing store, which is also the GPU buffer size.
    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.capacity() * RECORD_SIZE
    }

    /// Ends the frame; returns how many records it held.
    #[inline]
    pub fn reset(&mut self) -> usize {
        self.counter.reset()
    }
}
