//! Host Controller Interface (HCI) packets
//!
//! Only the slice of HCI needed for device inquiry: three commands, the events
//! they produce, and the Extended Inquiry Response payload.

pub mod command;
pub mod eir;
pub mod event;

pub use command::HciCommand;
pub use eir::{EirField, ExtendedInquiryResponse};
pub use event::{HciEvent, InquiryResponse, InquiryResultKind};

/// HCI packet indicator for commands
pub const COMMAND_PACKET: u8 = 0x01;

/// HCI packet indicator for events
pub const EVENT_PACKET: u8 = 0x04;

/// Link Control command group
pub const OGF_LINK_CONTROL: u8 = 0x01;

/// Build an opcode from its group and command fields
#[must_use]
pub const fn opcode(ogf: u8, ocf: u16) -> u16 {
    ((ogf as u16) << 10) | (ocf & 0x03FF)
}

/// HCI opcodes used by the inquiry engine
pub mod opcodes {
    use super::{OGF_LINK_CONTROL, opcode};

    /// Inquiry
    pub const INQUIRY: u16 = opcode(OGF_LINK_CONTROL, 0x0001);
    /// Inquiry Cancel
    pub const INQUIRY_CANCEL: u16 = opcode(OGF_LINK_CONTROL, 0x0002);
    /// Remote Name Request
    pub const REMOTE_NAME_REQUEST: u16 = opcode(OGF_LINK_CONTROL, 0x0019);
}

/// HCI event codes used by the inquiry engine
pub mod event_codes {
    /// Inquiry Complete
    pub const INQUIRY_COMPLETE: u8 = 0x01;
    /// Inquiry Result
    pub const INQUIRY_RESULT: u8 = 0x02;
    /// Remote Name Request Complete
    pub const REMOTE_NAME_REQUEST_COMPLETE: u8 = 0x07;
    /// Command Complete
    pub const COMMAND_COMPLETE: u8 = 0x0E;
    /// Command Status
    pub const COMMAND_STATUS: u8 = 0x0F;
    /// Inquiry Result with RSSI
    pub const INQUIRY_RESULT_WITH_RSSI: u8 = 0x22;
    /// Extended Inquiry Result
    pub const EXTENDED_INQUIRY_RESULT: u8 = 0x2F;
}
