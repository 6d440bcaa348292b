/// Errors that can occur while decoding a frame.
///
/// Every failure is returned as a value; the decoder never panics or unwinds
/// on malformed input. `TooShort` and `Incomplete` mean "not enough bytes
/// yet" and are the only variants a stream accumulator should ever see when
/// it polls with [`is_frame_complete`](crate::is_frame_complete) first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than the 5-byte minimum frame, or a declared length
    /// below that minimum.
    #[error("frame shorter than the 5-byte minimum ({len} bytes)")]
    TooShort { len: usize },

    /// The declared frame length exceeds the bytes available.
    #[error("incomplete frame (declared {declared} bytes, {available} available)")]
    Incomplete { declared: usize, available: usize },

    /// A tag byte outside the defined 0x00..=0x0F range.
    #[error("invalid type tag 0x{tag:02X} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },

    /// A value's payload would run past the declared frame length.
    #[error("value data exceeds declared frame length ({declared} bytes)")]
    DataTooShort { declared: usize },

    /// The root value did not consume exactly the declared length.
    #[error("frame length mismatch (declared {declared}, consumed {consumed})")]
    FrameLengthMismatch { declared: usize, consumed: usize },

    /// The 0xFF varint marker, which has no defined payload in this format.
    #[error("unsupported varint marker 0xFF")]
    UnsupportedVarintEncoding,

    /// A 4-byte varint above 2147483647; lengths must stay representable as
    /// signed 32-bit indices.
    #[error("varint length {len} out of range (max 2147483647)")]
    LengthOutOfRange { len: u32 },

    /// Nesting deeper than `Limits::max_depth`.
    #[error("nesting depth exceeded (max {max})")]
    DepthExceeded { max: u32 },

    /// A byte string longer than `Limits::max_bytes_len`.
    #[error("byte string too long ({len} bytes, max {max})")]
    BytesTooLong { len: usize, max: usize },
}

/// Errors that can occur while encoding a value.
///
/// An encode error aborts the whole call; no partial bytes are returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A length or count beyond the varint encodable range (the format has
    /// no 8-byte length representation), or a frame larger than 4 GiB.
    #[error("length {len} exceeds the varint encodable range")]
    ValueTooLarge { len: u64 },

    /// Nesting deeper than the configured depth limit.
    #[error("nesting depth exceeded (max {max})")]
    DepthExceeded { max: u32 },
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
