//! Ring buffer (sliding window) for dictionary decompression.
//!
//! The legacy container's LZSS scheme addresses its dictionary by absolute
//! position rather than by distance from the write head, and resets the
//! window to a fixed fill byte and start position at every block.

/// Common window parameters.
pub mod sizes {
    /// LZSS dictionary size (4 KB).
    pub const LZSS: usize = 4096;
    /// Maximum LZSS match length.
    pub const LZSS_MAX_MATCH: usize = 18;
    /// Byte the LZSS dictionary is filled with on reset.
    pub const LZSS_FILL: u8 = 0x20;
}

/// A fixed-capacity circular buffer addressed by absolute position.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Next write position.
    position: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create a zero-filled ring buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            position: 0,
            mask: capacity - 1,
        }
    }

    /// Create the LZSS dictionary in its reset state.
    pub fn lzss() -> Self {
        let mut ring = Self::new(sizes::LZSS);
        ring.reset_lzss();
        ring
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Fill every slot with `fill` and move the write position to `start`.
    pub fn reset(&mut self, fill: u8, start: usize) {
        self.buffer.fill(fill);
        self.position = start & self.mask;
    }

    /// Reset to the LZSS block state: spaces, writing at `capacity - 18`.
    pub fn reset_lzss(&mut self) {
        let start = self.capacity() - sizes::LZSS_MAX_MATCH;
        self.reset(sizes::LZSS_FILL, start);
    }

    /// Write a single byte and advance.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
    }

    /// Byte at an absolute position (wrapped).
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.buffer[index & self.mask]
    }

    /// Copy `length` bytes starting at absolute position `start`.
    ///
    /// Each byte is written back at the head before the next is read, so a
    /// source range overlapping the head repeats freshly written bytes.
    pub fn copy_absolute(&mut self, start: usize, length: usize, output: &mut Vec<u8>) {
        for i in 0..length {
            let byte = self.get(start + i);
            output.push(byte);
            self.write_byte(byte);
        }
    }
}
