//! Extended Inquiry Response (EIR) data
//!
//! The EIR block is a run of `(length, type, payload)` structures where
//! `length` covers the type byte and the payload. A zero length, or the end of
//! the block, ends the run.

use crate::constants::EIR_DATA_LENGTH;
use crate::uuid::BluetoothUuid;
use heapless::Vec;

/// EIR data types this crate interprets
pub mod data_types {
    /// Flags
    pub const FLAGS: u8 = 0x01;
    /// Incomplete list of 16-bit service UUIDs
    pub const INCOMPLETE_UUID16: u8 = 0x02;
    /// Complete list of 16-bit service UUIDs
    pub const COMPLETE_UUID16: u8 = 0x03;
    /// Incomplete list of 32-bit service UUIDs
    pub const INCOMPLETE_UUID32: u8 = 0x04;
    /// Complete list of 32-bit service UUIDs
    pub const COMPLETE_UUID32: u8 = 0x05;
    /// Incomplete list of 128-bit service UUIDs
    pub const INCOMPLETE_UUID128: u8 = 0x06;
    /// Complete list of 128-bit service UUIDs
    pub const COMPLETE_UUID128: u8 = 0x07;
    /// Shortened local name
    pub const SHORTENED_LOCAL_NAME: u8 = 0x08;
    /// Complete local name
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    /// TX power level
    pub const TX_POWER_LEVEL: u8 = 0x0A;
}

/// One EIR structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EirField<'a> {
    /// Data type byte
    pub data_type: u8,
    /// Payload after the type byte
    pub data: &'a [u8],
}

/// Iterator over the structures of an EIR block
#[derive(Debug, Clone)]
pub struct EirFields<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Iterator for EirFields<'a> {
    type Item = EirField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.data.get(self.position)?);
        if len == 0 {
            return None;
        }
        let end = self.position + 1 + len;
        let field = self.data.get(self.position + 1..end)?;
        self.position = end;
        Some(EirField {
            data_type: field[0],
            data: &field[1..],
        })
    }
}

/// Extended Inquiry Response block from an Extended Inquiry Result event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedInquiryResponse {
    data: Vec<u8, EIR_DATA_LENGTH>,
}

impl ExtendedInquiryResponse {
    /// Copy an EIR block; anything past 240 bytes is dropped
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        let len = data.len().min(EIR_DATA_LENGTH);
        let mut block = Vec::new();
        block.extend_from_slice(&data[..len]).ok();
        Self { data: block }
    }

    /// Raw block bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over the EIR structures
    #[must_use]
    pub fn fields(&self) -> EirFields<'_> {
        EirFields {
            data: &self.data,
            position: 0,
        }
    }

    /// Payload of the first structure of `data_type`
    #[must_use]
    pub fn find(&self, data_type: u8) -> Option<&[u8]> {
        self.fields()
            .find(|field| field.data_type == data_type)
            .map(|field| field.data)
    }

    /// Complete local name
    #[must_use]
    pub fn local_name(&self) -> Option<&[u8]> {
        self.find(data_types::COMPLETE_LOCAL_NAME)
    }

    /// Shortened local name
    #[must_use]
    pub fn short_name(&self) -> Option<&[u8]> {
        self.find(data_types::SHORTENED_LOCAL_NAME)
    }

    /// Advertised TX power in dBm
    #[must_use]
    pub fn tx_power(&self) -> Option<i8> {
        self.find(data_types::TX_POWER_LEVEL)
            .and_then(|data| data.first())
            .map(|&level| i8::from_le_bytes([level]))
    }

    /// Service UUIDs from every UUID list structure, in block order
    #[must_use]
    pub fn service_uuids(&self) -> Vec<BluetoothUuid, 120> {
        let mut uuids = Vec::new();
        for field in self.fields() {
            match field.data_type {
                data_types::INCOMPLETE_UUID16 | data_types::COMPLETE_UUID16 => {
                    for chunk in field.data.chunks_exact(2) {
                        let uuid = u16::from_le_bytes([chunk[0], chunk[1]]);
                        uuids.push(BluetoothUuid::Uuid16(uuid)).ok();
                    }
                }
                data_types::INCOMPLETE_UUID32 | data_types::COMPLETE_UUID32 => {
                    for chunk in field.data.chunks_exact(4) {
                        let uuid = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                        uuids.push(BluetoothUuid::Uuid32(uuid)).ok();
                    }
                }
                data_types::INCOMPLETE_UUID128 | data_types::COMPLETE_UUID128 => {
                    for chunk in field.data.chunks_exact(16) {
                        let mut bytes = [0u8; 16];
                        bytes.copy_from_slice(chunk);
                        uuids
                            .push(BluetoothUuid::Uuid128(u128::from_le_bytes(bytes)))
                            .ok();
                    }
                }
                _ => {}
            }
        }
        uuids
    }
}
