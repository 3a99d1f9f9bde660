//! Sprite command path.
//!
//! Everything here is host-side and GPU-free: the packed record format, the
//! fixed-capacity command buffer, the frame counter, the batch that drives a
//! flush, and a CPU mirror of the shader math.

mod batch;
mod buffer;
mod frame;
pub mod math;
mod record;
mod sink;
mod tint;

pub use batch::{Sprite, SpriteBatch, SpriteUniforms};
pub use buffer::CommandBuffer;
pub use frame::FrameCounter;
pub use record::{SpriteRecord, RECORD_SIZE};
pub use sink::{FlushStats, FrameSink};
pub use tint::{Tint, TintMultiplier};
