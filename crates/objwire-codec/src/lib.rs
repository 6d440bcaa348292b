//! Self-describing binary object codec.
//!
//! Every message is one frame:
//! - A 4-byte little-endian total length (which includes itself)
//! - One tagged value: 1 tag byte, then a type-specific payload
//!
//! Values are scalars, UTF-8 strings, byte strings, lists, and string-keyed
//! maps, nested arbitrarily. Lengths and counts use a compact varint. There
//! is no schema; the tags inline in the payload make each frame
//! self-describing.
//!
//! Decoding is bounds-checked against the declared length at every step and
//! returns structured errors instead of panicking, so corrupt frames are
//! safe to feed from untrusted peers (set [`Limits::max_depth`] when doing
//! so).

pub mod decode;
pub mod encode;
pub mod error;
pub mod limits;
pub mod tag;
pub mod value;

pub use decode::{decode, is_frame_complete, read_declared_size, MIN_FRAME_LEN};
pub use encode::{encode, encode_into, encode_with_limits};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use limits::Limits;
pub use tag::Tag;
pub use value::Value;
