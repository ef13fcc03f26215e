//! Reusable per-tick scratch buffers.
//!
//! The frame loop converts every RGB frame to grayscale; reusing one
//! buffer across ticks keeps the steady state allocation-free.

/// Reusable grayscale scratch buffer sized for the largest frame seen.
#[derive(Debug, Default)]
pub struct FrameBuffers {
    gray: Vec<u8>,
}

impl FrameBuffers {
    /// Create an empty pool; the buffer grows on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool pre-sized for `width` x `height` frames
    pub fn with_frame_size(width: usize, height: usize) -> Self {
        Self {
            gray: vec![0u8; width * height],
        }
    }

    /// Grayscale buffer of exactly `len` bytes, grown if needed.
    /// Capacity is retained across calls.
    pub fn grayscale(&mut self, len: usize) -> &mut [u8] {
        if self.gray.len() < len {
            self.gray.resize(len, 0);
        }
        &mut self.gray[..len]
    }

    /// Take the grayscale buffer out of the pool, sized to at least
    /// `len` bytes. Pair with [`FrameBuffers::put_back`] so the capacity
    /// survives to the next tick.
    pub fn take_grayscale(&mut self, len: usize) -> Vec<u8> {
        let mut buf = std::mem::take(&mut self.gray);
        if buf.len() < len {
            buf.resize(len, 0);
        }
        buf
    }

    /// Return a buffer previously taken with
    /// [`FrameBuffers::take_grayscale`]
    pub fn put_back(&mut self, buf: Vec<u8>) {
        self.gray = buf;
    }

    /// Current buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.gray.len()
    }
}
