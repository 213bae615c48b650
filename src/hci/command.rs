//! HCI command encoding

use super::{COMMAND_PACKET, opcodes};
use crate::address::BluetoothAddress;
use crate::constants::{MAX_COMMAND_PACKET_SIZE, RESERVED_FIELD};
use heapless::Vec;

/// Encoded command packet, indicator byte included
pub type CommandPacket = Vec<u8, MAX_COMMAND_PACKET_SIZE>;

/// Commands the inquiry engine sends to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HciCommand {
    /// Start an inquiry
    Inquiry {
        /// Inquiry access code, 24 bits
        lap: u32,
        /// Duration in 1.28 s units
        duration: u8,
        /// Responses before the controller stops, 0 for unlimited
        max_responses: u8,
    },
    /// Stop the running inquiry
    InquiryCancel,
    /// Ask a remote device for its user-friendly name
    RemoteNameRequest {
        /// Device to query
        address: BluetoothAddress,
        /// Page scan repetition mode from the inquiry result
        page_scan_repetition_mode: u8,
        /// Clock offset from the inquiry result, passed through as received
        clock_offset: u16,
    },
}

impl HciCommand {
    /// Opcode of this command
    #[must_use]
    pub const fn opcode(&self) -> u16 {
        match self {
            Self::Inquiry { .. } => opcodes::INQUIRY,
            Self::InquiryCancel => opcodes::INQUIRY_CANCEL,
            Self::RemoteNameRequest { .. } => opcodes::REMOTE_NAME_REQUEST,
        }
    }

    /// Encode as `[0x01, opcode (LE), parameter length, parameters...]`
    #[must_use]
    pub fn encode(&self) -> CommandPacket {
        let mut params = Vec::<u8, 16>::new();
        match *self {
            Self::Inquiry {
                lap,
                duration,
                max_responses,
            } => {
                params.extend_from_slice(&lap.to_le_bytes()[..3]).ok();
                params.push(duration).ok();
                params.push(max_responses).ok();
            }
            Self::InquiryCancel => {}
            Self::RemoteNameRequest {
                address,
                page_scan_repetition_mode,
                clock_offset,
            } => {
                params.extend_from_slice(&address.to_wire()).ok();
                params.push(page_scan_repetition_mode).ok();
                params.push(RESERVED_FIELD).ok();
                params.extend_from_slice(&clock_offset.to_le_bytes()).ok();
            }
        }

        let mut packet = CommandPacket::new();
        packet.push(COMMAND_PACKET).ok();
        packet.extend_from_slice(&self.opcode().to_le_bytes()).ok();
        let len = u8::try_from(params.len()).unwrap_or(u8::MAX);
        packet.push(len).ok();
        packet.extend_from_slice(&params).ok();
        packet
    }
}
