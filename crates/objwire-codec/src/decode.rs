//! Bounds-checked frame decoder.
//!
//! One call parses exactly one frame. Every read is checked against the
//! declared frame length before it happens, every helper returns a
//! `Result`, and the first error aborts the call. Malformed input can never
//! panic or unwind the caller.

use bytes::Bytes;

use crate::error::{DecodeError, DecodeResult};
use crate::limits::Limits;
use crate::tag::Tag;
use crate::value::Value;

/// Smallest possible frame: 4-byte length prefix + 1-byte Null tag.
pub const MIN_FRAME_LEN: usize = 5;

/// Read the 4-byte declared frame length at `start`.
///
/// Returns `None` when fewer than [`MIN_FRAME_LEN`] bytes remain, i.e. when
/// the prefix itself may not be trusted yet.
pub fn read_declared_size(buf: &[u8], start: usize) -> Option<u32> {
    if start >= buf.len() || buf.len() - start < MIN_FRAME_LEN {
        return None;
    }
    Some(u32::from_le_bytes(buf[start..start + 4].try_into().unwrap()))
}

/// Check whether a complete frame is present in `[start, start+available)`.
///
/// This is the polling primitive for stream accumulators: it never fails and
/// never allocates. If it returns false, [`decode`] on the same window is
/// guaranteed to fail with `TooShort` or `Incomplete`.
pub fn is_frame_complete(buf: &[u8], start: usize, available: usize) -> bool {
    if available < MIN_FRAME_LEN {
        return false;
    }
    if start >= buf.len() || buf.len() - start < available {
        return false;
    }
    let declared = u32::from_le_bytes(buf[start..start + 4].try_into().unwrap()) as usize;
    declared >= MIN_FRAME_LEN && declared <= available
}

/// Decode exactly one frame starting at `start`.
///
/// Returns the decoded value and the number of bytes consumed (the declared
/// frame length). Bytes past the frame are ignored; a second frame can be
/// decoded by calling again at `start + consumed`.
pub fn decode(buf: &[u8], start: usize, limits: &Limits) -> DecodeResult<(Value, usize)> {
    let available = buf.len().saturating_sub(start);
    if available < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: available });
    }

    let declared = u32::from_le_bytes(buf[start..start + 4].try_into().unwrap()) as usize;
    if declared < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: declared });
    }
    if declared > available {
        return Err(DecodeError::Incomplete {
            declared,
            available,
        });
    }

    let mut reader = Reader {
        buf,
        start,
        declared,
        read: 4,
        depth: 0,
        limits,
    };
    let value = reader.read_value()?;

    if reader.read != declared {
        return Err(DecodeError::FrameLengthMismatch {
            declared,
            consumed: reader.read,
        });
    }
    Ok((value, declared))
}

struct Reader<'a> {
    buf: &'a [u8],
    start: usize,
    /// Declared frame length, including the 4-byte prefix.
    declared: usize,
    /// Bytes consumed so far, including the prefix.
    read: usize,
    depth: u32,
    limits: &'a Limits,
}

impl<'a> Reader<'a> {
    /// Consume `n` bytes, failing if they would run past the declared length.
    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if n > self.declared - self.read {
            return Err(DecodeError::DataTooShort {
                declared: self.declared,
            });
        }
        let at = self.start + self.read;
        self.read += n;
        Ok(&self.buf[at..at + n])
    }

    fn take_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_value(&mut self) -> DecodeResult<Value> {
        self.depth += 1;
        if self.limits.max_depth != 0 && self.depth > self.limits.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.limits.max_depth,
            });
        }

        let offset = self.start + self.read;
        let byte = self.take_u8()?;
        let tag = Tag::from_u8(byte).ok_or(DecodeError::InvalidTag { tag: byte, offset })?;

        let value = match tag {
            Tag::Null => Value::Null,
            Tag::Bool => Value::Bool(self.take_u8()? != 0),
            Tag::Int8 => Value::Int8(self.take_u8()? as i8),
            Tag::Int16 => Value::Int16(i16::from_le_bytes(self.take(2)?.try_into().unwrap())),
            Tag::Int32 => Value::Int32(i32::from_le_bytes(self.take(4)?.try_into().unwrap())),
            Tag::Int64 => Value::Int64(i64::from_le_bytes(self.take(8)?.try_into().unwrap())),
            Tag::UInt8 => Value::UInt8(self.take_u8()?),
            Tag::UInt16 => Value::UInt16(u16::from_le_bytes(self.take(2)?.try_into().unwrap())),
            Tag::UInt32 => Value::UInt32(u32::from_le_bytes(self.take(4)?.try_into().unwrap())),
            Tag::UInt64 => Value::UInt64(u64::from_le_bytes(self.take(8)?.try_into().unwrap())),
            Tag::Float32 => Value::Float32(f32::from_le_bytes(self.take(4)?.try_into().unwrap())),
            Tag::Float64 => Value::Float64(f64::from_le_bytes(self.take(8)?.try_into().unwrap())),
            Tag::Utf8String => Value::String(self.read_string()?),
            Tag::ByteString => {
                let len = self.read_varint()?;
                let max = self.limits.max_bytes_len as usize;
                if max != 0 && len > max {
                    return Err(DecodeError::BytesTooLong { len, max });
                }
                Value::Bytes(Bytes::copy_from_slice(self.take(len)?))
            }
            Tag::List => {
                let count = self.read_varint()?;
                // Each element needs at least a tag byte, which caps how many
                // can actually fit in the remaining frame bytes.
                let mut items = Vec::with_capacity(count.min(self.declared - self.read));
                for _ in 0..count {
                    items.push(self.read_value()?);
                }
                Value::Array(items)
            }
            Tag::Map => {
                let count = self.read_varint()?;
                let mut pairs = Vec::with_capacity(count.min(self.declared - self.read));
                for _ in 0..count {
                    let key = self.read_string()?;
                    let val = self.read_value()?;
                    pairs.push((key, val));
                }
                Value::Map(pairs)
            }
        };

        self.depth -= 1;
        Ok(value)
    }

    /// Decode mirror of the encoder's varint. The 4-byte form is capped so
    /// decoded lengths stay representable as signed 32-bit indices.
    fn read_varint(&mut self) -> DecodeResult<usize> {
        let flag = self.take_u8()?;
        match flag {
            0xFF => Err(DecodeError::UnsupportedVarintEncoding),
            0xFE => {
                let len = u32::from_le_bytes(self.take(4)?.try_into().unwrap());
                if len > i32::MAX as u32 {
                    return Err(DecodeError::LengthOutOfRange { len });
                }
                Ok(len as usize)
            }
            0xFD => Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()) as usize),
            literal => Ok(literal as usize),
        }
    }

    /// Varint-length-prefixed UTF-8. Invalid sequences are replaced rather
    /// than rejected, matching the reference implementation.
    fn read_string(&mut self) -> DecodeResult<String> {
        let len = self.read_varint()?;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode, encode_into};
    use bytes::{BufMut, BytesMut};

    fn roundtrip(value: Value) -> Value {
        let bytes = encode(&value).unwrap();
        let (decoded, consumed) = decode(&bytes, 0, &Limits::UNBOUNDED).unwrap();
        assert_eq!(consumed, bytes.len());
        decoded
    }

    #[test]
    fn roundtrip_scalars() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::int(-1),
            Value::int(-300),
            Value::int(-100_000),
            Value::int(i64::MIN),
            Value::uint(0),
            Value::uint(254),
            Value::uint(65_000),
            Value::uint(4_000_000_000),
            Value::uint(u64::MAX),
            Value::Float32(1.25),
            Value::Float64(-2.5e300),
        ] {
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn roundtrip_strings_and_bytes() {
        assert_eq!(roundtrip("".into()), Value::String(String::new()));
        assert_eq!(
            roundtrip("snow ❄ and 犬".into()),
            Value::String("snow ❄ and 犬".into())
        );
        let blob = Value::from(vec![0xDEu8, 0xAD, 0xBE, 0xEF]);
        assert_eq!(roundtrip(blob.clone()), blob);
        // Long enough to exercise the 2-byte varint form.
        let long = Value::String("x".repeat(70_000));
        assert_eq!(roundtrip(long.clone()), long);
    }

    #[test]
    fn roundtrip_nested_containers() {
        let value = Value::Map(vec![
            ("id".into(), Value::uint(12_345)),
            (
                "payload".into(),
                Value::Array(vec![
                    Value::Null,
                    Value::Map(vec![("inner".into(), Value::from(-0.125f64))]),
                    Value::from(vec![1u8, 2, 3]),
                ]),
            ),
            ("ok".into(), Value::Bool(true)),
        ]);
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn map_key_order_preserved() {
        let value = Value::Map(vec![
            ("z".into(), Value::uint(1)),
            ("a".into(), Value::uint(2)),
            ("m".into(), Value::uint(3)),
        ]);
        let decoded = roundtrip(value);
        let keys: Vec<&str> = decoded
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn decode_at_offset() {
        let mut wire = BytesMut::new();
        encode_into(&Value::Null, &Limits::UNBOUNDED, &mut wire).unwrap();
        let second_start = wire.len();
        encode_into(&Value::uint(9), &Limits::UNBOUNDED, &mut wire).unwrap();

        let (first, consumed) = decode(&wire, 0, &Limits::UNBOUNDED).unwrap();
        assert_eq!(first, Value::Null);
        assert_eq!(consumed, second_start);

        let (second, _) = decode(&wire, second_start, &Limits::UNBOUNDED).unwrap();
        assert_eq!(second, Value::UInt8(9));
    }

    #[test]
    fn too_short_inputs() {
        assert_eq!(
            decode(&[], 0, &Limits::UNBOUNDED),
            Err(DecodeError::TooShort { len: 0 })
        );
        assert_eq!(
            decode(&[0x05, 0x00, 0x00, 0x00], 0, &Limits::UNBOUNDED),
            Err(DecodeError::TooShort { len: 4 })
        );
        // Declared length below the 5-byte minimum.
        assert_eq!(
            decode(&[0x04, 0x00, 0x00, 0x00, 0x00], 0, &Limits::UNBOUNDED),
            Err(DecodeError::TooShort { len: 4 })
        );
    }

    #[test]
    fn one_byte_short_is_incomplete() {
        let bytes = encode(&Value::from("hello")).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        assert_eq!(
            decode(truncated, 0, &Limits::UNBOUNDED),
            Err(DecodeError::Incomplete {
                declared: bytes.len(),
                available: bytes.len() - 1,
            })
        );
    }

    #[test]
    fn invalid_tag_rejected() {
        let frame = [0x06, 0x00, 0x00, 0x00, 0x13, 0x00];
        assert_eq!(
            decode(&frame, 0, &Limits::UNBOUNDED),
            Err(DecodeError::InvalidTag {
                tag: 0x13,
                offset: 4
            })
        );
    }

    #[test]
    fn payload_overrunning_frame_is_data_too_short() {
        // Declared length 6 but the Int32 payload needs 4 more bytes.
        let frame = [0x06, 0x00, 0x00, 0x00, 0x04, 0x01];
        assert_eq!(
            decode(&frame, 0, &Limits::UNBOUNDED),
            Err(DecodeError::DataTooShort { declared: 6 })
        );
    }

    #[test]
    fn trailing_bytes_are_length_mismatch() {
        // Null payload but declared length claims one extra byte.
        let frame = [0x06, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            decode(&frame, 0, &Limits::UNBOUNDED),
            Err(DecodeError::FrameLengthMismatch {
                declared: 6,
                consumed: 5
            })
        );
    }

    #[test]
    fn varint_0xff_unsupported() {
        let mut frame = BytesMut::new();
        frame.put_u32_le(14);
        frame.put_u8(Tag::Utf8String as u8);
        frame.put_u8(0xFF);
        frame.put_u64_le(1);
        assert_eq!(
            decode(&frame, 0, &Limits::UNBOUNDED),
            Err(DecodeError::UnsupportedVarintEncoding)
        );
    }

    #[test]
    fn varint_length_out_of_range() {
        let mut frame = BytesMut::new();
        frame.put_u32_le(10);
        frame.put_u8(Tag::ByteString as u8);
        frame.put_u8(0xFE);
        frame.put_u32_le(0x8000_0000);
        assert_eq!(
            decode(&frame, 0, &Limits::UNBOUNDED),
            Err(DecodeError::LengthOutOfRange { len: 0x8000_0000 })
        );
    }

    #[test]
    fn depth_limit_enforced() {
        // Array nested four levels deep.
        let mut value = Value::Array(vec![]);
        for _ in 0..3 {
            value = Value::Array(vec![value]);
        }
        let bytes = encode(&value).unwrap();

        assert_eq!(
            decode(&bytes, 0, &Limits::new(3, 0)),
            Err(DecodeError::DepthExceeded { max: 3 })
        );
        assert!(decode(&bytes, 0, &Limits::new(4, 0)).is_ok());
        assert!(decode(&bytes, 0, &Limits::UNBOUNDED).is_ok());
    }

    #[test]
    fn byte_string_limit_enforced() {
        let value = Value::from(vec![0u8; 32]);
        let bytes = encode(&value).unwrap();

        assert_eq!(
            decode(&bytes, 0, &Limits::new(0, 16)),
            Err(DecodeError::BytesTooLong { len: 32, max: 16 })
        );
        assert!(decode(&bytes, 0, &Limits::new(0, 32)).is_ok());
    }

    #[test]
    fn lossy_utf8_decode() {
        let mut frame = BytesMut::new();
        frame.put_u32_le(8);
        frame.put_u8(Tag::Utf8String as u8);
        frame.put_u8(2); // varint length
        frame.put_slice(&[0xC3, 0x28]); // invalid UTF-8 sequence
        let (value, _) = decode(&frame, 0, &Limits::UNBOUNDED).unwrap();
        assert_eq!(value.as_str(), Some("\u{FFFD}("));
    }

    #[test]
    fn read_declared_size_behavior() {
        let bytes = encode(&Value::Bool(true)).unwrap();
        assert_eq!(read_declared_size(&bytes, 0), Some(6));
        assert_eq!(read_declared_size(&bytes[..4], 0), None);
        assert_eq!(read_declared_size(&bytes, 2), None);
        assert_eq!(read_declared_size(&[], 0), None);
    }

    #[test]
    fn is_frame_complete_agrees_with_decode() {
        let bytes = encode(&Value::from("agreement")).unwrap();

        for available in 0..bytes.len() {
            assert!(!is_frame_complete(&bytes[..available], 0, available));
            let err = decode(&bytes[..available], 0, &Limits::UNBOUNDED).unwrap_err();
            assert!(matches!(
                err,
                DecodeError::TooShort { .. } | DecodeError::Incomplete { .. }
            ));
        }

        assert!(is_frame_complete(&bytes, 0, bytes.len()));
        assert!(decode(&bytes, 0, &Limits::UNBOUNDED).is_ok());
    }

    #[test]
    fn is_frame_complete_window_bounds() {
        let bytes = encode(&Value::Null).unwrap();
        // Window claiming more bytes than the buffer holds.
        assert!(!is_frame_complete(&bytes, 0, bytes.len() + 1));
        assert!(!is_frame_complete(&bytes, bytes.len(), 5));
        // Trailing garbage after a complete frame is fine for the check.
        let mut padded = bytes.to_vec();
        padded.extend_from_slice(&[0xAA; 3]);
        assert!(is_frame_complete(&padded, 0, padded.len()));
    }

    #[test]
    fn float64_roundtrip_epsilon() {
        let bytes = encode(&Value::from(0.1f64 + 0.2f64)).unwrap();
        let (value, _) = decode(&bytes, 0, &Limits::UNBOUNDED).unwrap();
        let got = value.as_f64().unwrap();
        assert!((got - 0.3).abs() < 1e-12);
    }
}
