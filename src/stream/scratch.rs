// Scratch workspace lent to the codec on every step.
//
// Owned by exactly one session. The memory is returned when the workspace
// drops, so every exit from the drive loop (success, codec error, growth
// failure) releases it once.

use log::trace;

use crate::error::StreamError;

/// Engine working memory sized by the compression profile.
#[derive(Debug)]
pub struct ScratchWorkspace {
    buf: Vec<u8>,
}

impl ScratchWorkspace {
    /// Allocate a zeroed workspace of `size` bytes.
    pub fn allocate(size: usize) -> Result<Self, StreamError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| StreamError::OutOfMemory { requested: size })?;
        buf.resize(size, 0);
        trace!("scratch workspace: allocated {size} bytes");
        Ok(Self { buf })
    }

    /// A zero-sized workspace for engines that keep their own state.
    pub fn empty() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        trace!("scratch workspace: released {} bytes", self.buf.len());
        #[cfg(test)]
        release_counter::bump();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_zeroed() {
        let mut ws = ScratchWorkspace::allocate(4096).unwrap();
        assert_eq!(ws.len(), 4096);
        assert!(ws.as_mut_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn released_once_on_drop() {
        release_counter::take();
        {
            let _ws = ScratchWorkspace::allocate(16).unwrap();
            let _empty = ScratchWorkspace::empty();
        }
        assert_eq!(release_counter::take(), 2);
    }

    #[test]
    fn impossible_size_is_out_of_memory() {
        release_counter::take();
        let err = ScratchWorkspace::allocate(usize::MAX).unwrap_err();
        assert!(matches!(err, StreamError::OutOfMemory { requested } if requested == usize::MAX));
        // Nothing was built, so nothing is released.
        assert_eq!(release_counter::take(), 0);
    }
}
