use crate::error::{Result, SpriteError};

/// Number of sprite records written since the last flush.
///
/// Invariant: `0 <= pending <= capacity`.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    pending: usize,
    capacity: usize,
}

impl FrameCounter {
    pub fn new(capacity: usize) -> Self {
        Self { pending: 0, capacity }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.pending == self.capacity
    }

    /// Claims the next slot and returns its index.
    #[inline]
    pub fn claim(&mut self) -> Result<usize> {
        if self.pending >= self.capacity {
            return Err(SpriteError::CapacityExceeded { capacity: self.capacity });
        }
        let slot = self.pending;
        self.pending += 1;
        Ok(slot)
    }

    /// Returns the count consumed by this flush and starts a new frame.
    #[inline]
    pub fn reset(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_sequential_slots() {
        let mut c = FrameCounter::new(3);
        assert_eq!(c.claim().unwrap(), 0);
        assert_eq!(c.claim().unwrap(), 1);
        assert_eq!(c.pending(), 2);
    }

    #[test]
    fn refuses_past_capacity() {
        let mut c = FrameCounter::new(2);
        c.claim().unwrap();
        c.claim().unwrap();
        assert!(c.is_full());
        assert!(matches!(
            c.claim(),
            Err(SpriteError::CapacityExceeded { capacity: 2 })
        ));
        // A refused claim leaves the count untouched.
        assert_eq!(c.pending(), 2);
    }

    #[test]
    fn reset_returns_previous_count() {
        let mut c = FrameCounter::new(4);
        c.claim().unwrap();
        c.claim().unwrap();
        assert_eq!(c.reset(), 2);
        assert_eq!(c.pending(), 0);
        assert_eq!(c.claim().unwrap(), 0);
    }
}
