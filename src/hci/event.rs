//! HCI event parsing
//!
//! Event packets are `[0x04, code, parameter length, parameters...]`. Inquiry
//! results pack their devices as parallel arrays: all addresses, then all page
//! scan repetition modes, and so on, so field offsets depend on the device count.

use super::eir::ExtendedInquiryResponse;
use super::{EVENT_PACKET, event_codes};
use crate::address::BluetoothAddress;
use crate::class_of_device::ClassOfDevice;
use crate::constants::{BD_ADDR_LENGTH, CLASS_OF_DEVICE_LENGTH, EIR_DATA_LENGTH};
use crate::device::DeviceName;
use crate::error::EventError;
use alloc::vec::Vec;

/// Which inquiry result event a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InquiryResultKind {
    /// Inquiry Result (0x02)
    Standard,
    /// Inquiry Result with RSSI (0x22)
    WithRssi,
    /// Extended Inquiry Result (0x2F)
    Extended,
}

impl InquiryResultKind {
    /// Bytes each device occupies in the event parameters
    const fn stride(self) -> usize {
        match self {
            Self::Standard | Self::WithRssi => 14,
            Self::Extended => 14 + EIR_DATA_LENGTH,
        }
    }
}

/// One device from an inquiry result event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryResponse {
    /// Device address
    pub address: BluetoothAddress,
    /// Page scan repetition mode, needed for the remote name request
    pub page_scan_repetition_mode: u8,
    /// Class of Device
    pub class_of_device: ClassOfDevice,
    /// Clock offset exactly as received
    pub clock_offset: u16,
    /// RSSI in dBm, absent from standard results
    pub rssi: Option<i8>,
    /// EIR block, extended results only
    pub eir: Option<ExtendedInquiryResponse>,
}

/// Events the inquiry engine understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HciEvent {
    /// Inquiry finished
    InquiryComplete {
        /// HCI status code
        status: u8,
    },
    /// One or more devices answered the inquiry
    InquiryResult {
        /// Source event
        kind: InquiryResultKind,
        /// Devices in event order
        responses: Vec<InquiryResponse>,
    },
    /// A remote name request finished
    RemoteNameRequestComplete {
        /// HCI status code, zero on success
        status: u8,
        /// Device that was queried
        address: BluetoothAddress,
        /// Reported name
        name: DeviceName,
    },
    /// A command finished
    CommandComplete {
        /// Command packets the controller can accept
        num_packets: u8,
        /// Opcode of the finished command
        opcode: u16,
        /// First return parameter, the status for most commands
        status: Option<u8>,
    },
    /// A command was accepted or rejected
    CommandStatus {
        /// HCI status code, zero if accepted
        status: u8,
        /// Command packets the controller can accept
        num_packets: u8,
        /// Opcode of the command
        opcode: u16,
    },
    /// Any other event
    Unknown {
        /// Event code
        code: u8,
    },
}

impl HciEvent {
    /// Parse an event packet, indicator byte included
    ///
    /// # Errors
    /// Returns [`EventError::NotAnEvent`] for other packet types and
    /// [`EventError::Truncated`] when the packet is shorter than its layout
    pub fn parse(packet: &[u8]) -> Result<Self, EventError> {
        let (&packet_type, rest) = packet
            .split_first()
            .ok_or(EventError::Truncated { code: 0 })?;
        if packet_type != EVENT_PACKET {
            return Err(EventError::NotAnEvent { packet_type });
        }
        let [code, len, params @ ..] = rest else {
            return Err(EventError::Truncated {
                code: rest.first().copied().unwrap_or(0),
            });
        };
        let code = *code;
        let truncated = EventError::Truncated { code };
        let params = params.get(..usize::from(*len)).ok_or(truncated)?;

        match code {
            event_codes::INQUIRY_COMPLETE => Ok(Self::InquiryComplete {
                status: *params.first().ok_or(truncated)?,
            }),
            event_codes::INQUIRY_RESULT => {
                parse_responses(params, InquiryResultKind::Standard).ok_or(truncated)
            }
            event_codes::INQUIRY_RESULT_WITH_RSSI => {
                parse_responses(params, InquiryResultKind::WithRssi).ok_or(truncated)
            }
            event_codes::EXTENDED_INQUIRY_RESULT => {
                parse_responses(params, InquiryResultKind::Extended).ok_or(truncated)
            }
            event_codes::REMOTE_NAME_REQUEST_COMPLETE => {
                let [status, rest @ ..] = params else {
                    return Err(truncated);
                };
                let address = rest
                    .get(..BD_ADDR_LENGTH)
                    .and_then(|wire| BluetoothAddress::from_wire(wire).ok())
                    .ok_or(truncated)?;
                Ok(Self::RemoteNameRequestComplete {
                    status: *status,
                    address,
                    name: DeviceName::from_bytes(&rest[BD_ADDR_LENGTH..]),
                })
            }
            event_codes::COMMAND_COMPLETE => match params {
                [num_packets, op_lo, op_hi, rest @ ..] => Ok(Self::CommandComplete {
                    num_packets: *num_packets,
                    opcode: u16::from_le_bytes([*op_lo, *op_hi]),
                    status: rest.first().copied(),
                }),
                _ => Err(truncated),
            },
            event_codes::COMMAND_STATUS => match params {
                [status, num_packets, op_lo, op_hi, ..] => Ok(Self::CommandStatus {
                    status: *status,
                    num_packets: *num_packets,
                    opcode: u16::from_le_bytes([*op_lo, *op_hi]),
                }),
                _ => Err(truncated),
            },
            _ => Ok(Self::Unknown { code }),
        }
    }
}

/// Decode the parallel arrays of an inquiry result
fn parse_responses(params: &[u8], kind: InquiryResultKind) -> Option<HciEvent> {
    let (&count, _) = params.split_first()?;
    let n = usize::from(count);
    if params.len() < 1 + n * kind.stride() {
        return None;
    }

    let (class_base, clock_base) = match kind {
        InquiryResultKind::Standard => (1 + 9 * n, 1 + 12 * n),
        InquiryResultKind::WithRssi | InquiryResultKind::Extended => (1 + 8 * n, 1 + 11 * n),
    };

    let mut responses = Vec::with_capacity(n);
    for i in 0..n {
        let addr_start = 1 + BD_ADDR_LENGTH * i;
        let address =
            BluetoothAddress::from_wire(&params[addr_start..addr_start + BD_ADDR_LENGTH]).ok()?;

        let class_start = class_base + CLASS_OF_DEVICE_LENGTH * i;
        let mut class = [0u8; CLASS_OF_DEVICE_LENGTH];
        class.copy_from_slice(&params[class_start..class_start + CLASS_OF_DEVICE_LENGTH]);

        let clock_start = clock_base + 2 * i;
        let clock_offset = u16::from_le_bytes([params[clock_start], params[clock_start + 1]]);

        let rssi = match kind {
            InquiryResultKind::Standard => None,
            _ => Some(i8::from_le_bytes([params[1 + 13 * n + i]])),
        };

        let eir = match kind {
            InquiryResultKind::Extended => {
                let eir_start = 1 + 14 * n + EIR_DATA_LENGTH * i;
                Some(ExtendedInquiryResponse::new(&params[eir_start..eir_start + EIR_DATA_LENGTH]))
            }
            _ => None,
        };

        responses.push(InquiryResponse {
            address,
            page_scan_repetition_mode: params[1 + 6 * n + i],
            class_of_device: ClassOfDevice::from_bytes(class),
            clock_offset,
            rssi,
            eir,
        });
    }

    Some(HciEvent::InquiryResult { kind, responses })
}
