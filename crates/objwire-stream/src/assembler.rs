//! Reassembly of complete frames from an arbitrarily fragmented byte stream.
//!
//! A [`StreamAssembler`] owns one accumulation buffer per logical
//! connection. Fragments go in through [`append`](StreamAssembler::append)
//! (with backpressure), complete frames come out of
//! [`deserialize`](StreamAssembler::deserialize), and leftover partial bytes
//! are carried to the next round. The backing storage grows geometrically
//! and shrinks only after a full window of sustained low occupancy.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bytes::Bytes;
use objwire_codec::{decode, is_frame_complete, read_declared_size, DecodeError, Limits, Value};
use tracing::{debug, trace};

use crate::window::{OccupancyWindow, DEFAULT_SHRINK_WINDOW};

/// Default backing-storage floor: 8 KiB.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024;

/// Configuration for a [`StreamAssembler`].
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Minimum capacity allocated on first append.
    pub initial_capacity: usize,
    /// Hard cap on buffered bytes; appends beyond it are rejected.
    /// 0 = unbounded.
    pub max_capacity: usize,
    /// Decode limits applied to every extracted frame.
    pub limits: Limits,
    /// Track occupancy and shrink the backing storage after sustained low
    /// usage.
    pub shrink_enabled: bool,
    /// Samples observed before a shrink is considered.
    pub shrink_window: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: 0,
            limits: Limits::UNBOUNDED,
            shrink_enabled: false,
            shrink_window: DEFAULT_SHRINK_WINDOW,
        }
    }
}

/// One extracted value, with the time its frame spent buffered.
///
/// `buffered` is populated for composite values (lists and maps) only.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub buffered: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
struct TimingSample {
    at: Instant,
    /// Occupied boundary when the append that produced this sample finished.
    end: usize,
}

/// Accumulates stream fragments and extracts complete frames.
///
/// Exclusively owns its backing storage; nothing else retains a reference
/// to it beyond a returned [`snapshot`](StreamAssembler::snapshot).
pub struct StreamAssembler {
    storage: Vec<u8>,
    occupied: usize,
    config: AssemblerConfig,
    window: Option<OccupancyWindow>,
    timings: VecDeque<TimingSample>,
}

impl StreamAssembler {
    /// Create an assembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    /// Create an assembler with explicit configuration.
    pub fn with_config(config: AssemblerConfig) -> Self {
        let window = config
            .shrink_enabled
            .then(|| OccupancyWindow::new(config.shrink_window));
        Self {
            storage: Vec::new(),
            occupied: 0,
            config,
            window,
            timings: VecDeque::new(),
        }
    }

    /// Append a fragment, growing the backing storage as needed.
    ///
    /// Returns `false` without mutating anything when the configured
    /// `max_capacity` would be exceeded. Callers must treat `false` as
    /// backpressure: stop feeding until a `deserialize` frees space.
    /// Sub-ranges of a larger read can be fed as `&fragment[start..end]`.
    pub fn append(&mut self, data: &[u8]) -> bool {
        let max = self.config.max_capacity;
        if max != 0 && self.occupied + data.len() > max {
            return false;
        }

        let required = (self.occupied + data.len()).max(self.config.initial_capacity);
        self.ensure_capacity(required);

        self.storage[self.occupied..self.occupied + data.len()].copy_from_slice(data);
        self.occupied += data.len();
        self.timings.push_back(TimingSample {
            at: Instant::now(),
            end: self.occupied,
        });
        true
    }

    /// Extract every complete frame currently buffered.
    ///
    /// Leftover partial bytes are compacted to the front of the storage and
    /// kept for the next append. Any decode failure discards the entire
    /// backlog — valid frames queued behind the malformed one included —
    /// and is surfaced to the caller; there is no resynchronization.
    pub fn deserialize(&mut self) -> Result<Vec<Decoded>, DecodeError> {
        if let Some(window) = &mut self.window {
            window.add(self.occupied);
        }

        let mut out = Vec::new();
        let mut cursor = 0usize;

        while is_frame_complete(&self.storage[..self.occupied], cursor, self.occupied - cursor) {
            match decode(&self.storage[..self.occupied], cursor, &self.config.limits) {
                Ok((value, consumed)) => {
                    cursor += consumed;
                    let buffered = self.consume_timings(cursor);
                    let buffered = match value {
                        Value::Array(_) | Value::Map(_) => buffered,
                        _ => None,
                    };
                    trace!(consumed, "extracted frame");
                    out.push(Decoded { value, buffered });
                }
                Err(err) => {
                    debug!(
                        error = %err,
                        discarded = self.occupied,
                        "malformed frame; discarding buffered data"
                    );
                    self.occupied = 0;
                    self.timings.clear();
                    return Err(err);
                }
            }
        }

        let leftover = self.occupied - cursor;
        if leftover > 0 {
            self.storage.copy_within(cursor..self.occupied, 0);
            for sample in &mut self.timings {
                sample.end -= cursor;
            }
        } else {
            self.timings.clear();
        }
        self.occupied = leftover;

        self.maybe_shrink();

        Ok(out)
    }

    /// Discard all buffered bytes. Storage is kept; bytes are not zeroed.
    pub fn clear(&mut self) {
        self.occupied = 0;
        self.timings.clear();
    }

    /// Owned copy of up to `max_len` (default: all) occupied bytes.
    pub fn snapshot(&self, max_len: Option<usize>) -> Bytes {
        let len = max_len.map_or(self.occupied, |m| m.min(self.occupied));
        Bytes::copy_from_slice(&self.storage[..len])
    }

    /// Peek one byte at `offset` without decoding.
    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        (offset < self.occupied).then(|| self.storage[offset])
    }

    /// Peek a little-endian u16 at `offset` without decoding.
    pub fn read_u16_le(&self, offset: usize) -> Option<u16> {
        let end = offset.checked_add(2)?;
        if end > self.occupied {
            return None;
        }
        Some(u16::from_le_bytes(
            self.storage[offset..end].try_into().unwrap(),
        ))
    }

    /// Peek a little-endian u32 at `offset` without decoding.
    pub fn read_u32_le(&self, offset: usize) -> Option<u32> {
        let end = offset.checked_add(4)?;
        if end > self.occupied {
            return None;
        }
        Some(u32::from_le_bytes(
            self.storage[offset..end].try_into().unwrap(),
        ))
    }

    /// Declared length of the frame at the front of the buffer, if the
    /// prefix is readable yet.
    pub fn next_frame_len(&self) -> Option<u32> {
        read_declared_size(&self.storage[..self.occupied], 0)
    }

    /// Bytes currently buffered.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Current backing-storage capacity.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Current assembler configuration.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Time since the oldest append still holding unconsumed bytes, then
    /// drop samples fully consumed by the frame ending at `new_cursor`.
    fn consume_timings(&mut self, new_cursor: usize) -> Option<Duration> {
        let buffered = self.timings.front().map(|s| s.at.elapsed());
        while self
            .timings
            .front()
            .is_some_and(|s| s.end <= new_cursor)
        {
            self.timings.pop_front();
        }
        buffered
    }

    fn ensure_capacity(&mut self, required: usize) {
        if required <= self.storage.len() {
            return;
        }
        let mut target = grow_target(required);
        if self.config.max_capacity != 0 {
            target = target.min(self.config.max_capacity);
        }

        let mut next = vec![0u8; target];
        next[..self.occupied].copy_from_slice(&self.storage[..self.occupied]);
        debug!(
            from = self.storage.len(),
            to = target,
            "grew accumulation buffer"
        );
        self.storage = next;

        // Growth invalidates prior occupancy history.
        if let Some(window) = &mut self.window {
            window.clear();
        }
    }

    /// Shrink only after a full observation window: take the window's peak,
    /// and reallocate down when 1.25x that peak still beats the current
    /// capacity and holds the bytes in flight.
    fn maybe_shrink(&mut self) {
        let Some(window) = &mut self.window else {
            return;
        };
        if !window.is_full() {
            return;
        }
        let peak = window.max();
        window.clear();

        let mut target = grow_target(peak);
        if self.config.max_capacity != 0 {
            target = target.min(self.config.max_capacity);
        }
        if target >= self.storage.len() || target < self.occupied {
            return;
        }

        let mut next = vec![0u8; target];
        next[..self.occupied].copy_from_slice(&self.storage[..self.occupied]);
        debug!(
            from = self.storage.len(),
            to = target,
            "shrank accumulation buffer"
        );
        self.storage = next;
    }
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// `ceil(size * 1.25)` — headroom over the exact requirement so steady
/// traffic does not reallocate on every append.
fn grow_target(size: usize) -> usize {
    (size * 5).div_ceil(4)
}
