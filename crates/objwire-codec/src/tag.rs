//! Wire type tags.
//!
//! Every encoded value starts with a 1-byte tag identifying its type.
//! List elements and map values are always fully tagged; map keys are
//! length-prefixed strings with no tag byte.

/// 1-byte type discriminator for an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = 0x00,
    Bool = 0x01,
    Int8 = 0x02,
    Int16 = 0x03,
    Int32 = 0x04,
    Int64 = 0x05,
    UInt8 = 0x06,
    UInt16 = 0x07,
    UInt32 = 0x08,
    UInt64 = 0x09,
    Float32 = 0x0A,
    Float64 = 0x0B,
    Utf8String = 0x0C,
    ByteString = 0x0D,
    List = 0x0E,
    Map = 0x0F,
}

impl Tag {
    /// Parse a tag byte. Returns `None` for bytes outside the defined range.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        match byte {
            0x00 => Some(Tag::Null),
            0x01 => Some(Tag::Bool),
            0x02 => Some(Tag::Int8),
            0x03 => Some(Tag::Int16),
            0x04 => Some(Tag::Int32),
            0x05 => Some(Tag::Int64),
            0x06 => Some(Tag::UInt8),
            0x07 => Some(Tag::UInt16),
            0x08 => Some(Tag::UInt32),
            0x09 => Some(Tag::UInt64),
            0x0A => Some(Tag::Float32),
            0x0B => Some(Tag::Float64),
            0x0C => Some(Tag::Utf8String),
            0x0D => Some(Tag::ByteString),
            0x0E => Some(Tag::List),
            0x0F => Some(Tag::Map),
            _ => None,
        }
    }

    /// Returns true for the eight numeric tags (integers and floats).
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Tag::Int8
                | Tag::Int16
                | Tag::Int32
                | Tag::Int64
                | Tag::UInt8
                | Tag::UInt16
                | Tag::UInt32
                | Tag::UInt64
                | Tag::Float32
                | Tag::Float64
        )
    }

    /// Returns true if two tags belong to the same type family.
    ///
    /// `Null` matches anything, numeric tags match each other, everything
    /// else requires an exact match.
    pub fn same_family(a: Tag, b: Tag) -> bool {
        if a == Tag::Null || b == Tag::Null {
            return true;
        }
        if a.is_numeric() {
            return b.is_numeric();
        }
        a == b
    }
}
