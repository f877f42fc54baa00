//! Fixed-capacity byte ring

/// Capacity of the receive and transmit rings
pub const SERIAL_BUFFER_SIZE: usize = 8;

/// Circular byte queue with power-of-two capacity
///
/// Writing to a full ring drops the byte. Reading an empty ring yields
/// `None`; callers still check [`RingBuffer::len`] first so a received
/// 0x00 is never confused with "nothing there".
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    storage: [u8; N],
    /// Next slot to read
    head: usize,
    /// Next slot to write
    tail: usize,
    count: usize,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring capacity must be a power of two");
        N - 1
    };

    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            storage: [0; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append a byte; returns false if the ring was full and the byte was dropped
    pub fn enqueue(&mut self, byte: u8) -> bool {
        if self.count == N {
            return false;
        }
        self.storage[self.tail] = byte;
        self.tail = (self.tail + 1) & Self::MASK;
        self.count += 1;
        true
    }

    /// Remove the oldest byte
    pub fn dequeue(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let byte = self.storage[self.head];
        self.head = (self.head + 1) & Self::MASK;
        self.count -= 1;
        Some(byte)
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Total capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}
