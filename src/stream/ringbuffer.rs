//! Bounded double-ended circular buffer.
//!
//! [`RingBuffer`] stores up to `capacity` elements in a fixed allocation and supports
//! push / pop at both ends plus indexed access relative to the front. A full buffer
//! rejects pushes with [`crate::Error::BufferFull`]; callers that need more room call
//! [`RingBuffer::grow`] explicitly, which re-linearises the contents into a larger
//! allocation.
//!
//! # Example
//!
//! ```rust
//! use x86scope::stream::RingBuffer;
//!
//! let mut buffer = RingBuffer::with_capacity(2);
//! buffer.push_back(1_u8)?;
//! buffer.push_front(0)?;
//! assert!(buffer.is_full());
//! assert!(buffer.push_back(2).is_err());
//!
//! buffer.grow(4);
//! buffer.push_back(2)?;
//! assert_eq!(buffer.get(2)?, 2);
//! assert_eq!(buffer.pop_front(), Some(0));
//! # Ok::<(), x86scope::Error>(())
//! ```

use crate::{Error, Result};

/// A bounded circular buffer with push / pop at both ends and indexed access.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Backing storage, always `capacity` slots long
    slots: Vec<T>,
    /// Physical index of the logical front element
    head: usize,
    /// Number of stored elements
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Creates an empty buffer that holds at most `capacity` elements.
    ///
    /// A capacity of zero is bumped to one so the buffer can always make progress.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RingBuffer {
            slots: vec![T::default(); capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    /// Returns the maximum number of elements the buffer can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of stored elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no elements are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if a push would be rejected.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Returns the number of free slots.
    #[must_use]
    pub fn free(&self) -> usize {
        self.slots.len() - self.len
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.head + index) % self.slots.len()
    }

    /// Appends an element at the back.
    ///
    /// # Errors
    /// Returns [`crate::Error::BufferFull`] if the buffer is at capacity.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::BufferFull {
                capacity: self.capacity(),
            });
        }

        let slot = self.physical(self.len);
        self.slots[slot] = value;
        self.len += 1;
        Ok(())
    }

    /// Prepends an element at the front.
    ///
    /// # Errors
    /// Returns [`crate::Error::BufferFull`] if the buffer is at capacity.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::BufferFull {
                capacity: self.capacity(),
            });
        }

        self.head = (self.head + self.slots.len() - 1) % self.slots.len();
        self.slots[self.head] = value;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the front element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = self.slots[self.head];
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Some(value)
    }

    /// Removes and returns the back element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.len -= 1;
        Some(self.slots[self.physical(self.len)])
    }

    /// Returns the element `index` positions from the front.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(out_of_bounds_error!());
        }

        Ok(self.slots[self.physical(index)])
    }

    /// Drops the first `count` elements.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` elements are stored.
    pub fn discard_front(&mut self, count: usize) -> Result<()> {
        if count > self.len {
            return Err(out_of_bounds_error!());
        }

        self.head = self.physical(count);
        self.len -= count;
        if self.len == 0 {
            self.head = 0;
        }
        Ok(())
    }

    /// Removes all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Enlarges the capacity to at least `capacity`, keeping element order.
    ///
    /// Does nothing if the buffer is already that large.
    pub fn grow(&mut self, capacity: usize) {
        if capacity <= self.slots.len() {
            return;
        }

        let mut slots = Vec::with_capacity(capacity);
        slots.extend(self.iter());
        slots.resize(capacity, T::default());

        self.slots = slots;
        self.head = 0;
    }

    /// Iterates over the stored elements from front to back.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |index| self.slots[self.physical(index)])
    }

    /// Copies the elements in `range` (front-relative) into a vector.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range extends past `len()`.
    pub fn to_vec(&self, range: std::ops::Range<usize>) -> Result<Vec<T>> {
        if range.start > range.end || range.end > self.len {
            return Err(out_of_bounds_error!());
        }

        Ok(range.map(|index| self.slots[self.physical(index)]).collect())
    }
}
