//! Circular window of recent buffer-occupancy samples.
//!
//! Feeds the assembler's shrink decision: capacity is only reduced after a
//! full window of sustained low occupancy, never on a single quiet moment.

/// Default number of samples observed before a shrink is considered.
pub const DEFAULT_SHRINK_WINDOW: usize = 50;

/// Fixed-capacity circular buffer of occupancy samples.
#[derive(Debug, Clone)]
pub struct OccupancyWindow {
    slots: Vec<usize>,
    next: usize,
    len: usize,
}

impl OccupancyWindow {
    /// Create a window holding up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            slots: vec![0; capacity],
            next: 0,
            len: 0,
        }
    }

    /// Record a sample, overwriting the oldest once the window is full.
    pub fn add(&mut self, sample: usize) {
        if self.len < self.slots.len() {
            self.len += 1;
        }
        self.slots[self.next] = sample;
        self.next = (self.next + 1) % self.slots.len();
    }

    /// Largest sample currently held, or 0 if the window is empty.
    pub fn max(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        let held = if self.is_full() {
            &self.slots[..]
        } else {
            // Not yet wrapped: samples occupy the first `len` slots.
            &self.slots[..self.len]
        };
        held.iter().copied().max().unwrap_or(0)
    }

    /// Drop all samples without deallocating.
    pub fn clear(&mut self) {
        self.next = 0;
        self.len = 0;
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
