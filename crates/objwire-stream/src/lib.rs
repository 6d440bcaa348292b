//! Streaming reassembly of length-prefixed object frames.
//!
//! Socket reads hand you arbitrary fragments; this crate turns them back
//! into complete decoded values. Feed fragments to a [`StreamAssembler`],
//! poll it with [`StreamAssembler::deserialize`], and it handles partial
//! frames, multiple frames per read, backpressure, and adaptive buffer
//! sizing. The codec itself lives in [`objwire_codec`].

pub mod assembler;
pub mod window;

pub use assembler::{AssemblerConfig, Decoded, StreamAssembler, DEFAULT_INITIAL_CAPACITY};
pub use window::{OccupancyWindow, DEFAULT_SHRINK_WINDOW};

pub use objwire_codec::{DecodeError, Limits, Value};
