//! `Bluejay` Constants
//!
//! Limits, default values and Bluetooth-assigned numbers used throughout the crate.

/// General Inquiry Access Code (GIAC) - standard inquiry LAP
pub const GIAC: u32 = 0x9E_8B33;

/// Limited Inquiry Access Code (LIAC)
pub const LIAC: u32 = 0x9E_8B00;

/// Default inquiry duration in 1.28s units (8 = ~10 seconds)
pub const DEFAULT_INQUIRY_DURATION: u8 = 8;

/// Maximum number of inquiry responses requested from the controller
pub const MAX_INQUIRY_RESPONSES: u8 = 255;

/// Page scan repetition mode R2, used when no inquiry result is at hand
pub const DEFAULT_PAGE_SCAN_REPETITION_MODE: u8 = 0x02;

/// Use the first available controller
pub const DEFAULT_DEVICE_ID: i16 = -1;

/// Maximum device name length in bytes (Remote Name Request Complete payload)
pub const MAX_DEVICE_NAME_LENGTH: usize = 248;

/// Extended Inquiry Response block length in bytes
pub const EIR_DATA_LENGTH: usize = 240;

/// `BD_ADDR` length in bytes
pub const BD_ADDR_LENGTH: usize = 6;

/// Class of Device length in bytes
pub const CLASS_OF_DEVICE_LENGTH: usize = 3;

/// Reserved field value
pub const RESERVED_FIELD: u8 = 0x00;

/// Size of the buffer used to receive one HCI event packet
pub const EVENT_BUFFER_SIZE: usize = 258;

/// Largest HCI command packet: indicator, opcode, length and 255 parameter bytes
pub const MAX_COMMAND_PACKET_SIZE: usize = 259;

/// Devices that can wait for name resolution in one session
pub const MAX_PENDING_NAMES: usize = 256;

/// Distinct addresses remembered as resolved in one session (power of two)
pub const MAX_RESOLVED_DEVICES: usize = 256;

/// Deepest data element nesting the SDP decoder follows
pub const MAX_NESTING_DEPTH: usize = 32;

/// First service record handle handed out by a registry
pub const FIRST_SERVICE_HANDLE: u32 = 0x0001_0000;

/// Lowest RFCOMM server channel
pub const RFCOMM_FIRST_CHANNEL: u16 = 1;

/// Highest RFCOMM server channel
pub const RFCOMM_LAST_CHANNEL: u16 = 30;

/// Lowest dynamically allocated L2CAP PSM
pub const L2CAP_FIRST_DYNAMIC_PSM: u16 = 0x1001;

/// Highest dynamically allocated L2CAP PSM
pub const L2CAP_LAST_DYNAMIC_PSM: u16 = 0x7FFF;
