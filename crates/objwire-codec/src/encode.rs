//! Depth-first frame encoder.
//!
//! Writes a 4-byte placeholder length, serializes the tagged value tree,
//! then backpatches the total length once it is known. Output buffers are
//! owned per call; nothing is shared between concurrent encodes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{EncodeError, EncodeResult};
use crate::limits::Limits;
use crate::value::Value;

const INITIAL_ENCODE_CAPACITY: usize = 256;

/// Encode a value into one complete frame with no depth limit.
pub fn encode(value: &Value) -> EncodeResult<Bytes> {
    encode_with_limits(value, &Limits::UNBOUNDED)
}

/// Encode a value into one complete frame, honoring `limits.max_depth`.
pub fn encode_with_limits(value: &Value, limits: &Limits) -> EncodeResult<Bytes> {
    let mut dst = BytesMut::with_capacity(INITIAL_ENCODE_CAPACITY);
    encode_into(value, limits, &mut dst)?;
    Ok(dst.freeze())
}

/// Encode a value into the tail of an existing buffer.
///
/// On error the buffer is restored to its pre-call length, so a failed
/// encode leaves no partial bytes behind.
pub fn encode_into(value: &Value, limits: &Limits, dst: &mut BytesMut) -> EncodeResult<()> {
    let base = dst.len();
    dst.put_u32_le(0); // placeholder, backpatched below

    let mut writer = Writer {
        dst: &mut *dst,
        depth: 0,
        max_depth: limits.max_depth,
    };

    if let Err(err) = writer.write_value(value) {
        dst.truncate(base);
        return Err(err);
    }

    let total = dst.len() - base;
    if total > u32::MAX as usize {
        dst.truncate(base);
        return Err(EncodeError::ValueTooLarge { len: total as u64 });
    }
    dst[base..base + 4].copy_from_slice(&(total as u32).to_le_bytes());
    Ok(())
}

struct Writer<'a> {
    dst: &'a mut BytesMut,
    depth: u32,
    max_depth: u32,
}

impl Writer<'_> {
    fn write_value(&mut self, value: &Value) -> EncodeResult<()> {
        self.depth += 1;
        if self.max_depth != 0 && self.depth > self.max_depth {
            return Err(EncodeError::DepthExceeded {
                max: self.max_depth,
            });
        }

        self.dst.put_u8(value.tag() as u8);

        match value {
            Value::Null => {}
            Value::Bool(v) => self.dst.put_u8(*v as u8),
            Value::Int8(v) => self.dst.put_i8(*v),
            Value::Int16(v) => self.dst.put_i16_le(*v),
            Value::Int32(v) => self.dst.put_i32_le(*v),
            Value::Int64(v) => self.dst.put_i64_le(*v),
            Value::UInt8(v) => self.dst.put_u8(*v),
            Value::UInt16(v) => self.dst.put_u16_le(*v),
            Value::UInt32(v) => self.dst.put_u32_le(*v),
            Value::UInt64(v) => self.dst.put_u64_le(*v),
            Value::Float32(v) => self.dst.put_f32_le(*v),
            Value::Float64(v) => self.dst.put_f64_le(*v),
            Value::String(s) => {
                self.write_varint(s.len() as u64)?;
                self.dst.put_slice(s.as_bytes());
            }
            Value::Bytes(b) => {
                self.write_varint(b.len() as u64)?;
                self.dst.put_slice(b);
            }
            Value::Array(items) => {
                self.write_varint(items.len() as u64)?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Value::Map(pairs) => {
                self.write_varint(pairs.len() as u64)?;
                for (key, val) in pairs {
                    self.write_varint(key.len() as u64)?;
                    self.dst.put_slice(key.as_bytes());
                    self.write_value(val)?;
                }
            }
        }

        self.depth -= 1;
        Ok(())
    }

    /// Variable-length unsigned integer used for all lengths and counts.
    ///
    /// `< 0xFD` literal byte, `0xFD` + u16, `0xFE` + u32. Larger values have
    /// no wire representation in this format.
    fn write_varint(&mut self, val: u64) -> EncodeResult<()> {
        if val < 0xFD {
            self.dst.put_u8(val as u8);
        } else if val <= 0xFFFF {
            self.dst.put_u8(0xFD);
            self.dst.put_u16_le(val as u16);
        } else if val <= 0xFFFF_FFFF {
            self.dst.put_u8(0xFE);
            self.dst.put_u32_le(val as u32);
        } else {
            return Err(EncodeError::ValueTooLarge { len: val });
        }
        Ok(())
    }
}
