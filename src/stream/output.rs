// Growable output buffer.
//
// The buffer is allocated on the first arrangement and doubles (clamped to
// the maximum) only when it is completely full. The write window handed to
// the codec is re-derived after every arrangement because growth may move
// the storage.

use log::debug;

use crate::error::StreamError;

/// Initial output capacity (16 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Default maximum: the largest size an allocation can have.
pub const UNBOUNDED: usize = isize::MAX as usize;

/// Free space made available by [`OutputBuffer::arrange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrangement {
    /// Buffer capacity after the call.
    pub capacity: usize,
    /// Bytes the codec may write in this window (capped to the chunk limit).
    pub free: usize,
}

/// Output storage for one session.
#[derive(Debug)]
pub struct OutputBuffer {
    storage: Vec<u8>,
    filled: usize,
    initial_capacity: usize,
    max_capacity: usize,
}

impl OutputBuffer {
    /// A buffer that allocates `initial_capacity` bytes (clamped to
    /// `max_capacity`) on first use.
    pub fn new(initial_capacity: usize, max_capacity: usize) -> Self {
        Self {
            storage: Vec::new(),
            filled: 0,
            initial_capacity: initial_capacity.min(max_capacity),
            max_capacity,
        }
    }

    pub fn with_initial_capacity(initial_capacity: usize) -> Self {
        Self::new(initial_capacity, UNBOUNDED)
    }

    /// Make room for the next codec step.
    ///
    /// Allocates on first use, grows only when every byte is occupied, and
    /// otherwise just reports the space left.
    pub fn arrange(&mut self, window_limit: usize) -> Result<Arrangement, StreamError> {
        if self.storage.is_empty() && self.initial_capacity > 0 {
            self.resize_to(self.initial_capacity)?;
        } else if self.filled == self.capacity() {
            let current = self.capacity();
            if current >= self.max_capacity {
                return Err(StreamError::CapacityExceeded {
                    max: self.max_capacity,
                });
            }
            let new_capacity = if current <= self.max_capacity / 2 {
                (current * 2).max(1)
            } else {
                self.max_capacity
            };
            debug!("output buffer full at {current} bytes, growing to {new_capacity}");
            self.resize_to(new_capacity)?;
        }

        Ok(Arrangement {
            capacity: self.capacity(),
            free: (self.capacity() - self.filled).min(window_limit),
        })
    }

    fn resize_to(&mut self, new_capacity: usize) -> Result<(), StreamError> {
        let additional = new_capacity - self.storage.len();
        self.storage
            .try_reserve_exact(additional)
            .map_err(|_| StreamError::OutOfMemory {
                requested: new_capacity,
            })?;
        self.storage.resize(new_capacity, 0);
        Ok(())
    }

    /// Writable window of `len` bytes starting at the fill position.
    ///
    /// # Panics
    ///
    /// If `len` exceeds the free space reported by the last arrangement.
    pub fn window(&mut self, len: usize) -> &mut [u8] {
        &mut self.storage[self.filled..self.filled + len]
    }

    /// Mark `produced` bytes of the current window as filled.
    pub fn commit(&mut self, produced: usize) {
        debug_assert!(self.filled + produced <= self.capacity());
        self.filled += produced;
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.filled]
    }

    /// Hand over exactly the filled bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.storage.truncate(self.filled);
        self.storage.shrink_to_fit();
        self.storage
    }
}
