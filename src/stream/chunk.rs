// Input chunking for engines whose per-step size field is 32 bits wide.

/// Largest chunk the engine's per-step size field can express.
pub const CHUNK_LIMIT: usize = u32::MAX as usize;

/// Split `remaining` into the next chunk and what is left after it.
///
/// The chunk is never larger than `limit`, and is zero only when nothing
/// remains.
pub fn take_chunk(remaining: usize, limit: usize) -> (usize, usize) {
    let chunk = remaining.min(limit);
    (chunk, remaining - chunk)
}

/// Tracks how much of the caller's input has been offered to the codec.
///
/// The cursor borrows the input; it never copies it.
#[derive(Debug, Clone)]
pub struct InputCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> InputCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Offer the next chunk of at most `limit` bytes.
    pub fn next_chunk(&mut self, limit: usize) -> &'a [u8] {
        let (chunk, _) = take_chunk(self.remaining(), limit);
        let start = self.position;
        self.position += chunk;
        &self.data[start..self.position]
    }

    /// Bytes not yet offered.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }
}
