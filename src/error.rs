//! Error types for `Bluejay`.
//!
//! Validation failures are raised before any I/O is attempted, decode failures
//! describe SDP bytes this crate cannot interpret, and transport failures come
//! from the HCI/SDP collaborator. [`Error`] ties them together for the
//! session-level operations.

use thiserror::Error;

/// Invalid caller input, detected before anything is encoded or sent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// A UUID string is not `XXXX`, `XXXXXXXX` or `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`
    #[error("invalid UUID specified for {field}")]
    InvalidUuid {
        /// Name of the offending field
        field: &'static str,
    },

    /// A Bluetooth address is not six hex pairs separated by `:` or `-`
    #[error("invalid Bluetooth address")]
    InvalidAddress,

    /// A profile descriptor version does not fit in 16 bits
    #[error("invalid profile descriptor: version {version:#x} out of range")]
    InvalidProfileVersion {
        /// The rejected version
        version: u32,
    },
}

/// Malformed or unsupported SDP data element bytes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Header byte names a type above 8 or a size the type does not allow
    #[error("invalid type/size descriptor {descriptor:#04x}")]
    InvalidDescriptor {
        /// The offending header byte
        descriptor: u8,
    },

    /// The buffer (or the enclosing sequence) ends before the element does
    #[error("truncated data element: {needed} bytes needed, {available} available")]
    Truncated {
        /// Bytes the element requires
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    /// 128-bit signed integers are not supported
    #[error("unsupported data element {descriptor:#04x}")]
    Unsupported {
        /// The offending header byte
        descriptor: u8,
    },

    /// Sequences nest deeper than the decoder allows
    #[error("data element sequences nested too deeply")]
    NestingTooDeep,

    /// A well-formed element appeared where the record layout expects another kind
    #[error("unexpected data element, expected {expected}")]
    UnexpectedElement {
        /// What the parser was looking for
        expected: &'static str,
    },
}

/// Malformed HCI packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventError {
    /// Packet indicator is not the HCI event type
    #[error("not an HCI event packet (type {packet_type:#04x})")]
    NotAnEvent {
        /// Packet indicator byte found
        packet_type: u8,
    },

    /// Packet is shorter than its header or event layout requires
    #[error("truncated HCI event {code:#04x}")]
    Truncated {
        /// Event code, zero if the header itself was cut short
        code: u8,
    },
}

/// Failure reported by the transport collaborator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Sending a packet failed
    #[error("failed to send packet")]
    Send,

    /// Receiving a packet failed
    #[error("failed to receive packet")]
    Receive,

    /// The underlying channel is closed
    #[error("transport closed")]
    Closed,
}

/// Crate-level error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid caller input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed SDP bytes
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `start` was called while a session is open
    #[error("already inquiring")]
    AlreadyInquiring,

    /// The endpoint already has a service record registered
    #[error("service already advertised on this endpoint")]
    AlreadyAdvertised,

    /// No service record with the given handle is registered
    #[error("service isn't advertised")]
    NotAdvertised,

    /// Every port of the requested protocol is taken
    #[error("no free port available")]
    NoFreePort,
}

/// Convenience type alias for Results with [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
