//! Signal Ring Buffer
//!
//! Fixed-capacity circular history of input signals. The newest entry sits
//! at `rear`; `front` marks the slot just before the oldest logical entry.
//!
//! ```text
//!   capacity = 6, after writes a b c d
//!
//!   index:  0    1    2    3    4    5
//!         [ - ][ a ][ b ][ c ][ d ][ - ]
//!           ^                   ^
//!         front               rear
//! ```
//!
//! Writing into a full buffer advances `front` over the oldest entry, so a
//! buffer of capacity N holds at most N - 1 logical entries while the N
//! most recent writes all stay readable through [`SignalBuffer::read`].
//! `front == rear` means empty, which is ambiguous for capacity 1, so
//! emptiness queries on such a buffer fail.

use thiserror::Error;

use super::signal::{Signal, SignalFlags};

/// Ring buffer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Capacity below 1.
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
    /// Read offset outside `[0, capacity)`.
    #[error("read offset {offset} out of range for capacity {capacity}")]
    OutOfRange {
        /// Requested offset
        offset: usize,
        /// Buffer capacity
        capacity: usize,
    },
    /// Nothing to dequeue.
    #[error("buffer is empty")]
    Empty,
    /// Emptiness cannot be decided with a single slot.
    #[error("emptiness is undefined for a buffer of capacity 1")]
    IndeterminateEmptiness,
}

/// Entry carrying a frame count, consumed by [`SignalBuffer::window_size`].
pub trait Timed {
    /// Frames this entry spans.
    fn frames(&self) -> u32;
}

impl<F: SignalFlags> Timed for Signal<F> {
    fn frames(&self) -> u32 {
        self.duration as u32
    }
}

/// Fixed-capacity circular buffer.
#[derive(Clone, Debug)]
pub struct SignalBuffer<T> {
    data: Vec<T>,
    front: usize,
    rear: usize,
}

impl<T: Clone + Default> SignalBuffer<T> {
    /// Create a buffer with `capacity` preallocated slots.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity < 1 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self {
            data: vec![T::default(); capacity],
            front: 0,
            rear: 0,
        })
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn step_back(&self, index: usize, by: usize) -> usize {
        let cap = self.capacity();
        (index + cap - by % cap) % cap
    }

    /// Write a new newest entry, overwriting the oldest when full.
    pub fn write(&mut self, item: T) {
        let next = (self.rear + 1) % self.capacity();
        if next == self.front {
            self.front = (self.front + 1) % self.capacity();
        }
        self.rear = next;
        self.data[self.rear] = item;
    }

    /// Read the entry `offset` writes back from the newest (0 = newest).
    pub fn read(&self, offset: usize) -> Result<&T, BufferError> {
        if offset >= self.capacity() {
            return Err(BufferError::OutOfRange {
                offset,
                capacity: self.capacity(),
            });
        }
        Ok(&self.data[self.step_back(self.rear, offset)])
    }

    /// Mutable access to the newest entry, if any.
    pub fn latest_mut(&mut self) -> Result<Option<&mut T>, BufferError> {
        if self.is_empty()? {
            return Ok(None);
        }
        Ok(Some(&mut self.data[self.rear]))
    }

    /// Whether there are no logical entries.
    pub fn is_empty(&self) -> Result<bool, BufferError> {
        if self.capacity() == 1 {
            return Err(BufferError::IndeterminateEmptiness);
        }
        Ok(self.front == self.rear)
    }

    /// Number of logical entries (at most `capacity - 1`).
    pub fn len(&self) -> Result<usize, BufferError> {
        if self.capacity() == 1 {
            return Err(BufferError::IndeterminateEmptiness);
        }
        Ok((self.rear + self.capacity() - self.front) % self.capacity())
    }

    /// Remove and return the oldest logical entry.
    pub fn dequeue_oldest(&mut self) -> Result<T, BufferError> {
        if self.is_empty()? {
            return Err(BufferError::Empty);
        }
        self.front = (self.front + 1) % self.capacity();
        Ok(std::mem::take(&mut self.data[self.front]))
    }

    /// Drop every entry and reset both indices.
    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = T::default();
        }
        self.front = 0;
        self.rear = 0;
    }
}

impl<T: Clone + Default + PartialEq> SignalBuffer<T> {
    /// Compare the entries at two newest-relative offsets.
    pub fn entries_equal(&self, a: usize, b: usize) -> Result<bool, BufferError> {
        Ok(self.read(a)? == self.read(b)?)
    }
}

impl<T: Clone + Default + Timed> SignalBuffer<T> {
    /// Count how many newest entries fit in a window of `frames` frames.
    ///
    /// Walks back from the newest entry, spending each entry's duration
    /// from the budget, until the budget is exhausted or the oldest entry
    /// has been visited. Returns `None` on an empty buffer.
    pub fn window_size(&self, frames: u32) -> Result<Option<usize>, BufferError> {
        if self.is_empty()? {
            return Ok(None);
        }

        let mut index = self.rear;
        let mut remaining = frames as i64;
        let mut count = 0;

        while remaining > 0 && index != self.front {
            remaining -= self.data[index].frames() as i64;
            count += 1;
            index = self.step_back(index, 1);
        }

        Ok(Some(count))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::signal::{Direction, DirectionSignal};
    use proptest::prelude::*;

    fn dir(duration: u8) -> DirectionSignal {
        DirectionSignal::held(Direction::FRONT, duration)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(SignalBuffer::<u32>::new(0).unwrap_err(), BufferError::ZeroCapacity);
    }

    #[test]
    fn test_capacity_one_emptiness_fails() {
        let mut buffer = SignalBuffer::<u32>::new(1).unwrap();
        buffer.write(7);
        assert_eq!(buffer.is_empty(), Err(BufferError::IndeterminateEmptiness));
        assert_eq!(buffer.dequeue_oldest(), Err(BufferError::IndeterminateEmptiness));
        assert_eq!(*buffer.read(0).unwrap(), 7);
    }

    #[test]
    fn test_read_newest_first() {
        let mut buffer = SignalBuffer::new(4).unwrap();
        buffer.write(1u32);
        buffer.write(2);
        buffer.write(3);
        assert_eq!(*buffer.read(0).unwrap(), 3);
        assert_eq!(*buffer.read(1).unwrap(), 2);
        assert_eq!(*buffer.read(2).unwrap(), 1);
        assert!(matches!(buffer.read(4), Err(BufferError::OutOfRange { offset: 4, capacity: 4 })));
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut buffer = SignalBuffer::new(3).unwrap();
        for i in 1..=5u32 {
            buffer.write(i);
        }
        assert_eq!(buffer.len().unwrap(), 2);
        assert_eq!(buffer.dequeue_oldest().unwrap(), 4);
        assert_eq!(buffer.dequeue_oldest().unwrap(), 5);
        assert_eq!(buffer.dequeue_oldest(), Err(BufferError::Empty));
    }

    #[test]
    fn test_window_size_empty_is_none() {
        let buffer = SignalBuffer::<DirectionSignal>::new(8).unwrap();
        assert_eq!(buffer.window_size(20).unwrap(), None);
    }

    #[test]
    fn test_window_size_spends_durations() {
        let mut buffer = SignalBuffer::new(8).unwrap();
        buffer.write(dir(10));
        buffer.write(dir(5));
        buffer.write(dir(3));
        // 3 + 5 = 8 < 9, so the third entry is visited too
        assert_eq!(buffer.window_size(9).unwrap(), Some(3));
        assert_eq!(buffer.window_size(8).unwrap(), Some(2));
        assert_eq!(buffer.window_size(1).unwrap(), Some(1));
        assert_eq!(buffer.window_size(500).unwrap(), Some(3));
    }

    #[test]
    fn test_clear_resets() {
        let mut buffer = SignalBuffer::new(4).unwrap();
        buffer.write(dir(2));
        buffer.clear();
        assert!(buffer.is_empty().unwrap());
        assert_eq!(*buffer.read(0).unwrap(), DirectionSignal::default());
    }

    #[test]
    fn test_entries_equal() {
        let mut buffer = SignalBuffer::new(4).unwrap();
        buffer.write(5u32);
        buffer.write(5);
        buffer.write(6);
        assert!(buffer.entries_equal(1, 2).unwrap());
        assert!(!buffer.entries_equal(0, 1).unwrap());
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent_writes(capacity in 2usize..32, writes in prop::collection::vec(any::<u32>(), 0..100)) {
            let mut buffer = SignalBuffer::new(capacity).unwrap();
            for w in &writes {
                buffer.write(*w);
            }

            let len = buffer.len().unwrap();
            prop_assert!(len < capacity);
            prop_assert_eq!(len, writes.len().min(capacity - 1));

            // every one of the last `capacity` writes is still readable
            for (offset, expected) in writes.iter().rev().take(capacity).enumerate() {
                prop_assert_eq!(buffer.read(offset).unwrap(), expected);
            }
        }

        #[test]
        fn prop_window_within_occupancy(capacity in 2usize..16, durations in prop::collection::vec(1u8..=99, 1..40), frames in 1u32..200) {
            let mut buffer = SignalBuffer::new(capacity).unwrap();
            for d in &durations {
                buffer.write(dir(*d));
            }
            let count = buffer.window_size(frames).unwrap().unwrap();
            prop_assert!(count >= 1);
            prop_assert!(count <= buffer.len().unwrap());
        }
    }
}
