//! The universal value model.
//!
//! A message encodes exactly one [`Value`] tree. Containers own their
//! children outright, so a value is always finite in depth and size and no
//! cycle checking is needed anywhere in the codec.

use bytes::Bytes;

use crate::tag::Tag;

/// A decoded or to-be-encoded wire value.
///
/// Maps preserve insertion order and are reconstructed by the decoder in
/// order of appearance. Key uniqueness is the producer's responsibility; the
/// format itself does not police it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Bytes),
    Array(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// The wire tag for this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Int8(_) => Tag::Int8,
            Value::Int16(_) => Tag::Int16,
            Value::Int32(_) => Tag::Int32,
            Value::Int64(_) => Tag::Int64,
            Value::UInt8(_) => Tag::UInt8,
            Value::UInt16(_) => Tag::UInt16,
            Value::UInt32(_) => Tag::UInt32,
            Value::UInt64(_) => Tag::UInt64,
            Value::Float32(_) => Tag::Float32,
            Value::Float64(_) => Tag::Float64,
            Value::String(_) => Tag::Utf8String,
            Value::Bytes(_) => Tag::ByteString,
            Value::Array(_) => Tag::List,
            Value::Map(_) => Tag::Map,
        }
    }

    /// Classify a signed integer into the smallest variant that holds it.
    ///
    /// Negative values pick Int8/Int16/Int32/Int64 by range; non-negative
    /// values go through the unsigned ladder.
    pub fn int(v: i64) -> Value {
        if v >= 0 {
            return Value::uint(v as u64);
        }
        if v >= -128 {
            Value::Int8(v as i8)
        } else if v >= -32_768 {
            Value::Int16(v as i16)
        } else if v >= -2_147_483_648 {
            Value::Int32(v as i32)
        } else {
            Value::Int64(v)
        }
    }

    /// Classify an unsigned integer into the smallest variant that holds it.
    pub fn uint(v: u64) -> Value {
        if v <= 255 {
            Value::UInt8(v as u8)
        } else if v <= 65_535 {
            Value::UInt16(v as u16)
        } else if v <= 4_294_967_295 {
            Value::UInt32(v as u32)
        } else {
            Value::UInt64(v)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Integer view, widening any integer variant that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int8(v) => Some(v as i64),
            Value::Int16(v) => Some(v as i64),
            Value::Int32(v) => Some(v as i64),
            Value::Int64(v) => Some(v),
            Value::UInt8(v) => Some(v as i64),
            Value::UInt16(v) => Some(v as i64),
            Value::UInt32(v) => Some(v as i64),
            Value::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Unsigned view, accepting non-negative signed variants.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::UInt8(v) => Some(v as u64),
            Value::UInt16(v) => Some(v as u64),
            Value::UInt32(v) => Some(v as u64),
            Value::UInt64(v) => Some(v),
            Value::Int8(v) => u64::try_from(v).ok(),
            Value::Int16(v) => u64::try_from(v).ok(),
            Value::Int32(v) => u64::try_from(v).ok(),
            Value::Int64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float32(v) => Some(v as f64),
            Value::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a map entry by key (first match, linear scan).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::int(v as i64)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::uint(v as u64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::uint(v as u64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::uint(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::uint(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<(String, Value)>> for Value {
    fn from(v: Vec<(String, Value)>) -> Self {
        Value::Map(v)
    }
}
