//! SDP Data Elements
//!
//! A data element is SDP's self-describing value: a header byte carrying a type
//! and a size descriptor, an optional explicit length, then the payload. This
//! module holds the in-memory form; [`super::codec`] maps it to and from bytes.

use crate::uuid::BluetoothUuid;
use alloc::vec::Vec;

/// Data element type identifier (top 5 bits of the header byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataElementType {
    /// Nil (null value)
    Nil = 0,
    /// Unsigned integer
    UnsignedInt = 1,
    /// Signed integer
    SignedInt = 2,
    /// UUID
    Uuid = 3,
    /// Text string
    TextString = 4,
    /// Boolean
    Boolean = 5,
    /// Data element sequence
    Sequence = 6,
    /// Data element alternative
    Alternative = 7,
    /// URL
    Url = 8,
}

impl DataElementType {
    /// Create from the 5-bit type value
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Nil),
            1 => Some(Self::UnsignedInt),
            2 => Some(Self::SignedInt),
            3 => Some(Self::Uuid),
            4 => Some(Self::TextString),
            5 => Some(Self::Boolean),
            6 => Some(Self::Sequence),
            7 => Some(Self::Alternative),
            8 => Some(Self::Url),
            _ => None,
        }
    }
}

/// Data element size descriptor (bottom 3 bits of the header byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataElementSize {
    /// 1 byte
    Size1 = 0,
    /// 2 bytes
    Size2 = 1,
    /// 4 bytes
    Size4 = 2,
    /// 8 bytes
    Size8 = 3,
    /// 16 bytes
    Size16 = 4,
    /// Additional 8-bit size descriptor follows
    AdditionalU8 = 5,
    /// Additional 16-bit size descriptor follows
    AdditionalU16 = 6,
    /// Additional 32-bit size descriptor follows
    AdditionalU32 = 7,
}

impl DataElementSize {
    /// Create from the 3-bit size index
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value & 0x07 {
            0 => Self::Size1,
            1 => Self::Size2,
            2 => Self::Size4,
            3 => Self::Size8,
            4 => Self::Size16,
            5 => Self::AdditionalU8,
            6 => Self::AdditionalU16,
            _ => Self::AdditionalU32,
        }
    }

    /// Smallest explicit-length descriptor able to hold `len`
    #[must_use]
    pub const fn for_length(len: usize) -> Self {
        if len < 0x100 {
            Self::AdditionalU8
        } else if len < 0x1_0000 {
            Self::AdditionalU16
        } else {
            Self::AdditionalU32
        }
    }
}

/// SDP Data Element
///
/// 128-bit signed integers have no representation here; the decoder reports
/// them as unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataElement {
    /// Nil (null value)
    Nil,
    /// Unsigned 8-bit integer
    UnsignedInt8(u8),
    /// Unsigned 16-bit integer
    UnsignedInt16(u16),
    /// Unsigned 32-bit integer
    UnsignedInt32(u32),
    /// Unsigned 64-bit integer
    UnsignedInt64(u64),
    /// Unsigned 128-bit integer
    UnsignedInt128(u128),
    /// Signed 8-bit integer
    SignedInt8(i8),
    /// Signed 16-bit integer
    SignedInt16(i16),
    /// Signed 32-bit integer
    SignedInt32(i32),
    /// Signed 64-bit integer
    SignedInt64(i64),
    /// UUID of any width
    Uuid(BluetoothUuid),
    /// Text string (raw bytes, usually UTF-8)
    TextString(Vec<u8>),
    /// Boolean value
    Boolean(bool),
    /// Data element sequence
    Sequence(Vec<DataElement>),
    /// Data element alternative
    Alternative(Vec<DataElement>),
    /// URL string
    Url(Vec<u8>),
}

impl DataElement {
    /// Create a text string data element
    #[must_use]
    pub fn text_string(text: &str) -> Self {
        Self::TextString(text.as_bytes().to_vec())
    }

    /// Create a URL data element
    #[must_use]
    pub fn url(url: &str) -> Self {
        Self::Url(url.as_bytes().to_vec())
    }

    /// Create a UUID data element
    #[must_use]
    pub fn uuid(uuid: impl Into<BluetoothUuid>) -> Self {
        Self::Uuid(uuid.into())
    }

    /// Get the data element type
    #[must_use]
    pub const fn data_type(&self) -> DataElementType {
        match self {
            Self::Nil => DataElementType::Nil,
            Self::UnsignedInt8(_)
            | Self::UnsignedInt16(_)
            | Self::UnsignedInt32(_)
            | Self::UnsignedInt64(_)
            | Self::UnsignedInt128(_) => DataElementType::UnsignedInt,
            Self::SignedInt8(_)
            | Self::SignedInt16(_)
            | Self::SignedInt32(_)
            | Self::SignedInt64(_) => DataElementType::SignedInt,
            Self::Uuid(_) => DataElementType::Uuid,
            Self::TextString(_) => DataElementType::TextString,
            Self::Boolean(_) => DataElementType::Boolean,
            Self::Sequence(_) => DataElementType::Sequence,
            Self::Alternative(_) => DataElementType::Alternative,
            Self::Url(_) => DataElementType::Url,
        }
    }

    /// Value as `u16`, for `UnsignedInt8`/`UnsignedInt16` elements
    #[must_use]
    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            Self::UnsignedInt8(value) => Some(u16::from(value)),
            Self::UnsignedInt16(value) => Some(value),
            _ => None,
        }
    }

    /// Value as `u32`, for unsigned elements up to 32 bits
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::UnsignedInt32(value) => Some(value),
            _ => self.as_u16().map(u32::from),
        }
    }

    /// The UUID carried by a `Uuid` element
    #[must_use]
    pub fn as_uuid(&self) -> Option<BluetoothUuid> {
        match *self {
            Self::Uuid(uuid) => Some(uuid),
            _ => None,
        }
    }

    /// Children of a sequence or alternative
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[DataElement]> {
        match self {
            Self::Sequence(items) | Self::Alternative(items) => Some(items),
            _ => None,
        }
    }

    /// Raw bytes of a text string or URL
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::TextString(bytes) | Self::Url(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether `uuid` appears anywhere in this element, comparing full 128-bit values
    #[must_use]
    pub fn contains_uuid(&self, uuid: &BluetoothUuid) -> bool {
        match self {
            Self::Uuid(own) => own.equivalent(uuid),
            Self::Sequence(items) | Self::Alternative(items) => {
                items.iter().any(|item| item.contains_uuid(uuid))
            }
            _ => false,
        }
    }
}

impl From<BluetoothUuid> for DataElement {
    fn from(uuid: BluetoothUuid) -> Self {
        Self::Uuid(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_data_element_type_from_u8() {
        assert_eq!(DataElementType::from_u8(6), Some(DataElementType::Sequence));
        assert_eq!(DataElementType::from_u8(8), Some(DataElementType::Url));
        assert_eq!(DataElementType::from_u8(9), None);
        assert_eq!(DataElementType::from_u8(31), None);
    }

    #[test]
    fn test_size_for_length() {
        assert_eq!(
            DataElementSize::for_length(0),
            DataElementSize::AdditionalU8
        );
        assert_eq!(
            DataElementSize::for_length(255),
            DataElementSize::AdditionalU8
        );
        assert_eq!(
            DataElementSize::for_length(256),
            DataElementSize::AdditionalU16
        );
        assert_eq!(
            DataElementSize::for_length(65535),
            DataElementSize::AdditionalU16
        );
        assert_eq!(
            DataElementSize::for_length(65536),
            DataElementSize::AdditionalU32
        );
    }

    #[test]
    fn test_data_element_text_string() {
        let text = DataElement::text_string("Hello World");
        assert_eq!(text.data_type(), DataElementType::TextString);
        assert_eq!(text.as_bytes(), Some(&b"Hello World"[..]));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(DataElement::UnsignedInt8(5).as_u16(), Some(5));
        assert_eq!(DataElement::UnsignedInt16(0x0102).as_u16(), Some(0x0102));
        assert_eq!(DataElement::UnsignedInt32(7).as_u16(), None);
        assert_eq!(DataElement::UnsignedInt32(7).as_u32(), Some(7));
        assert_eq!(
            DataElement::uuid(0x1101u16).as_uuid(),
            Some(BluetoothUuid::Uuid16(0x1101))
        );
        assert_eq!(DataElement::Nil.as_sequence(), None);
    }

    #[test]
    fn test_contains_uuid() {
        let element = DataElement::Sequence(vec![
            DataElement::Sequence(vec![DataElement::uuid(0x0100u16)]),
            DataElement::Sequence(vec![
                DataElement::uuid(0x0003u16),
                DataElement::UnsignedInt8(5),
            ]),
        ]);

        let rfcomm_full = BluetoothUuid::Uuid16(0x0003).to_full();
        assert!(element.contains_uuid(&rfcomm_full));
        assert!(!element.contains_uuid(&BluetoothUuid::Uuid16(0x1101)));
    }
}
