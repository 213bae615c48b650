//! SDP data element wire codec
//!
//! Header byte is `type << 3 | size`. Fixed-size descriptors 0..=4 select 1, 2,
//! 4, 8 or 16 payload bytes; 5, 6 and 7 prefix the payload with a big-endian
//! length of 1, 2 or 4 bytes. Encoding always picks the smallest length width.
//! Every multi-byte integer is big-endian.

use super::element::{DataElement, DataElementSize, DataElementType};
use crate::constants::MAX_NESTING_DEPTH;
use crate::error::DecodeError;
use crate::uuid::BluetoothUuid;
use alloc::vec::Vec;

/// Encode a data element into a fresh buffer
#[must_use]
pub fn encode(element: &DataElement) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(element));
    encode_into(element, &mut out);
    out
}

/// Append the encoding of `element` to `out`
pub fn encode_into(element: &DataElement, out: &mut Vec<u8>) {
    match element {
        DataElement::Nil => out.push(header(DataElementType::Nil, DataElementSize::Size1)),
        DataElement::UnsignedInt8(v) => {
            out.push(header(DataElementType::UnsignedInt, DataElementSize::Size1));
            out.push(*v);
        }
        DataElement::UnsignedInt16(v) => {
            out.push(header(DataElementType::UnsignedInt, DataElementSize::Size2));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::UnsignedInt32(v) => {
            out.push(header(DataElementType::UnsignedInt, DataElementSize::Size4));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::UnsignedInt64(v) => {
            out.push(header(DataElementType::UnsignedInt, DataElementSize::Size8));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::UnsignedInt128(v) => {
            out.push(header(DataElementType::UnsignedInt, DataElementSize::Size16));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::SignedInt8(v) => {
            out.push(header(DataElementType::SignedInt, DataElementSize::Size1));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::SignedInt16(v) => {
            out.push(header(DataElementType::SignedInt, DataElementSize::Size2));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::SignedInt32(v) => {
            out.push(header(DataElementType::SignedInt, DataElementSize::Size4));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::SignedInt64(v) => {
            out.push(header(DataElementType::SignedInt, DataElementSize::Size8));
            out.extend_from_slice(&v.to_be_bytes());
        }
        DataElement::Uuid(uuid) => match *uuid {
            BluetoothUuid::Uuid16(v) => {
                out.push(header(DataElementType::Uuid, DataElementSize::Size2));
                out.extend_from_slice(&v.to_be_bytes());
            }
            BluetoothUuid::Uuid32(v) => {
                out.push(header(DataElementType::Uuid, DataElementSize::Size4));
                out.extend_from_slice(&v.to_be_bytes());
            }
            BluetoothUuid::Uuid128(v) => {
                out.push(header(DataElementType::Uuid, DataElementSize::Size16));
                out.extend_from_slice(&v.to_be_bytes());
            }
        },
        DataElement::Boolean(v) => {
            out.push(header(DataElementType::Boolean, DataElementSize::Size1));
            out.push(u8::from(*v));
        }
        DataElement::TextString(bytes) => {
            push_length_header(out, DataElementType::TextString, bytes.len());
            out.extend_from_slice(bytes);
        }
        DataElement::Url(bytes) => {
            push_length_header(out, DataElementType::Url, bytes.len());
            out.extend_from_slice(bytes);
        }
        DataElement::Sequence(items) | DataElement::Alternative(items) => {
            let body: usize = items.iter().map(encoded_len).sum();
            push_length_header(out, element.data_type(), body);
            for item in items {
                encode_into(item, out);
            }
        }
    }
}

/// Number of bytes [`encode`] produces for `element`
#[must_use]
pub fn encoded_len(element: &DataElement) -> usize {
    match element {
        DataElement::Nil => 1,
        DataElement::UnsignedInt8(_) | DataElement::SignedInt8(_) | DataElement::Boolean(_) => 2,
        DataElement::UnsignedInt16(_) | DataElement::SignedInt16(_) => 3,
        DataElement::UnsignedInt32(_) | DataElement::SignedInt32(_) => 5,
        DataElement::UnsignedInt64(_) | DataElement::SignedInt64(_) => 9,
        DataElement::UnsignedInt128(_) => 17,
        DataElement::Uuid(uuid) => 1 + uuid.encoded_width(),
        DataElement::TextString(bytes) | DataElement::Url(bytes) => {
            length_header_len(bytes.len()) + bytes.len()
        }
        DataElement::Sequence(items) | DataElement::Alternative(items) => {
            let body: usize = items.iter().map(encoded_len).sum();
            length_header_len(body) + body
        }
    }
}

/// Decode one data element from the start of `data`
///
/// Returns the element and the number of bytes it occupied; trailing bytes are
/// left for the caller.
///
/// # Errors
/// Returns a [`DecodeError`] for a bad header, a short buffer, a signed 128-bit
/// integer, or nesting deeper than [`MAX_NESTING_DEPTH`]
pub fn decode(data: &[u8]) -> Result<(DataElement, usize), DecodeError> {
    let mut reader = Reader::new(data);
    let element = reader.element(0)?;
    Ok((element, reader.position))
}

const fn header(data_type: DataElementType, size: DataElementSize) -> u8 {
    ((data_type as u8) << 3) | size as u8
}

const fn length_header_len(len: usize) -> usize {
    match DataElementSize::for_length(len) {
        DataElementSize::AdditionalU8 => 2,
        DataElementSize::AdditionalU16 => 3,
        _ => 5,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn push_length_header(out: &mut Vec<u8>, data_type: DataElementType, len: usize) {
    let size = DataElementSize::for_length(len);
    out.push(header(data_type, size));
    match size {
        DataElementSize::AdditionalU8 => out.push(len as u8),
        DataElementSize::AdditionalU16 => out.extend_from_slice(&(len as u16).to_be_bytes()),
        _ => out.extend_from_slice(&(len as u32).to_be_bytes()),
    }
}

/// Cursor over a bounded byte slice
struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if count > available {
            return Err(DecodeError::Truncated {
                needed: count,
                available,
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn length(&mut self, size: DataElementSize) -> Result<usize, DecodeError> {
        Ok(match size {
            DataElementSize::AdditionalU8 => usize::from(self.array::<1>()?[0]),
            DataElementSize::AdditionalU16 => usize::from(u16::from_be_bytes(self.array()?)),
            _ => u32::from_be_bytes(self.array()?) as usize,
        })
    }

    fn element(&mut self, depth: usize) -> Result<DataElement, DecodeError> {
        let descriptor = self.array::<1>()?[0];
        let data_type = DataElementType::from_u8(descriptor >> 3)
            .ok_or(DecodeError::InvalidDescriptor { descriptor })?;
        let size = DataElementSize::from_u8(descriptor);
        let invalid = DecodeError::InvalidDescriptor { descriptor };

        let element = match (data_type, size) {
            (DataElementType::Nil, DataElementSize::Size1) => DataElement::Nil,

            (DataElementType::UnsignedInt, DataElementSize::Size1) => {
                DataElement::UnsignedInt8(self.array::<1>()?[0])
            }
            (DataElementType::UnsignedInt, DataElementSize::Size2) => {
                DataElement::UnsignedInt16(u16::from_be_bytes(self.array()?))
            }
            (DataElementType::UnsignedInt, DataElementSize::Size4) => {
                DataElement::UnsignedInt32(u32::from_be_bytes(self.array()?))
            }
            (DataElementType::UnsignedInt, DataElementSize::Size8) => {
                DataElement::UnsignedInt64(u64::from_be_bytes(self.array()?))
            }
            (DataElementType::UnsignedInt, DataElementSize::Size16) => {
                DataElement::UnsignedInt128(u128::from_be_bytes(self.array()?))
            }

            (DataElementType::SignedInt, DataElementSize::Size1) => {
                DataElement::SignedInt8(i8::from_be_bytes(self.array()?))
            }
            (DataElementType::SignedInt, DataElementSize::Size2) => {
                DataElement::SignedInt16(i16::from_be_bytes(self.array()?))
            }
            (DataElementType::SignedInt, DataElementSize::Size4) => {
                DataElement::SignedInt32(i32::from_be_bytes(self.array()?))
            }
            (DataElementType::SignedInt, DataElementSize::Size8) => {
                DataElement::SignedInt64(i64::from_be_bytes(self.array()?))
            }
            (DataElementType::SignedInt, DataElementSize::Size16) => {
                return Err(DecodeError::Unsupported { descriptor });
            }

            (DataElementType::Uuid, DataElementSize::Size2) => {
                DataElement::Uuid(BluetoothUuid::Uuid16(u16::from_be_bytes(self.array()?)))
            }
            (DataElementType::Uuid, DataElementSize::Size4) => {
                DataElement::Uuid(BluetoothUuid::Uuid32(u32::from_be_bytes(self.array()?)))
            }
            (DataElementType::Uuid, DataElementSize::Size16) => {
                DataElement::Uuid(BluetoothUuid::Uuid128(u128::from_be_bytes(self.array()?)))
            }

            (DataElementType::Boolean, DataElementSize::Size1) => {
                DataElement::Boolean(self.array::<1>()?[0] != 0)
            }

            (
                DataElementType::TextString | DataElementType::Url,
                DataElementSize::AdditionalU8
                | DataElementSize::AdditionalU16
                | DataElementSize::AdditionalU32,
            ) => {
                let len = self.length(size)?;
                let bytes = self.take(len)?.to_vec();
                if data_type == DataElementType::Url {
                    DataElement::Url(bytes)
                } else {
                    DataElement::TextString(bytes)
                }
            }

            (
                DataElementType::Sequence | DataElementType::Alternative,
                DataElementSize::AdditionalU8
                | DataElementSize::AdditionalU16
                | DataElementSize::AdditionalU32,
            ) => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(DecodeError::NestingTooDeep);
                }
                let len = self.length(size)?;
                let mut body = Reader::new(self.take(len)?);
                let mut items = Vec::new();
                while body.remaining() > 0 {
                    items.push(body.element(depth + 1)?);
                }
                if data_type == DataElementType::Alternative {
                    DataElement::Alternative(items)
                } else {
                    DataElement::Sequence(items)
                }
            }

            _ => return Err(invalid),
        };
        Ok(element)
    }
}
