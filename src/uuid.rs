//! Bluetooth UUIDs
//!
//! SDP accepts UUIDs in three widths. Text forms are `XXXX` (16-bit), `XXXXXXXX`
//! (32-bit) and the dashed `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` (128-bit), all
//! case-insensitive. Short UUIDs are aliases into the Bluetooth Base UUID
//! `00000000-0000-1000-8000-00805F9B34FB`: their digits overlay the first 4 (or 8)
//! hex positions.

use crate::error::ValidationError;
use alloc::{format, string::String};
use core::fmt;
use core::str::FromStr;

/// Bluetooth Base UUID `00000000-0000-1000-8000-00805F9B34FB`
pub const BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_0080_5F9B_34FB;

/// Suffix appended to an 8-digit UUID to form the 128-bit text form
const BASE_UUID_SUFFIX: &str = "-0000-1000-8000-00805F9B34FB";

/// A Bluetooth UUID, remembering the width it was written or encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BluetoothUuid {
    /// 16-bit UUID
    Uuid16(u16),
    /// 32-bit UUID
    Uuid32(u32),
    /// 128-bit UUID
    Uuid128(u128),
}

impl BluetoothUuid {
    /// Parse any of the three text forms
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidUuid`] if [`validate_uuid`] rejects `s`
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::parse_field(s, "uuid")
    }

    /// Parse a UUID, naming `field` in the error
    pub(crate) fn parse_field(s: &str, field: &'static str) -> Result<Self, ValidationError> {
        let invalid = ValidationError::InvalidUuid { field };
        match s.len() {
            4 if all_hex(s) => u16::from_str_radix(s, 16)
                .map(Self::Uuid16)
                .map_err(|_| invalid),
            8 if all_hex(s) => u32::from_str_radix(s, 16)
                .map(Self::Uuid32)
                .map_err(|_| invalid),
            36 if dashed_layout(s) => ::uuid::Uuid::parse_str(s)
                .map(|u| Self::Uuid128(u.as_u128()))
                .map_err(|_| invalid),
            _ => Err(invalid),
        }
    }

    /// The full 128-bit value, expanding short forms onto the Base UUID
    #[must_use]
    pub const fn to_u128(&self) -> u128 {
        match *self {
            Self::Uuid16(short) => BASE_UUID | ((short as u128) << 96),
            Self::Uuid32(short) => BASE_UUID | ((short as u128) << 96),
            Self::Uuid128(full) => full,
        }
    }

    /// The same UUID in its 128-bit form
    #[must_use]
    pub const fn to_full(&self) -> Self {
        Self::Uuid128(self.to_u128())
    }

    /// Number of payload bytes this UUID occupies in an SDP data element
    #[must_use]
    pub const fn encoded_width(&self) -> usize {
        match self {
            Self::Uuid16(_) => 2,
            Self::Uuid32(_) => 4,
            Self::Uuid128(_) => 16,
        }
    }

    /// Whether two UUIDs denote the same 128-bit value, whatever their widths
    #[must_use]
    pub const fn equivalent(&self, other: &Self) -> bool {
        self.to_u128() == other.to_u128()
    }
}

impl fmt::Display for BluetoothUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Uuid16(short) => write!(f, "{short:04X}"),
            Self::Uuid32(short) => write!(f, "{short:08X}"),
            Self::Uuid128(full) => {
                let mut buffer = ::uuid::Uuid::encode_buffer();
                f.write_str(
                    ::uuid::Uuid::from_u128(full)
                        .hyphenated()
                        .encode_upper(&mut buffer),
                )
            }
        }
    }
}

impl FromStr for BluetoothUuid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u16> for BluetoothUuid {
    fn from(short: u16) -> Self {
        Self::Uuid16(short)
    }
}

impl From<u32> for BluetoothUuid {
    fn from(short: u32) -> Self {
        Self::Uuid32(short)
    }
}

impl From<u128> for BluetoothUuid {
    fn from(full: u128) -> Self {
        Self::Uuid128(full)
    }
}

fn all_hex(s: &str) -> bool {
    s.bytes().all(|c| c.is_ascii_hexdigit())
}

/// `8-4-4-4-12` hex groups with dashes at exactly those boundaries
fn dashed_layout(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => c == b'-',
        _ => c.is_ascii_hexdigit(),
    })
}

/// Check whether `uuid` is a 16-bit, 32-bit or dashed 128-bit UUID string
#[must_use]
pub fn validate_uuid(uuid: &str) -> bool {
    match uuid.len() {
        4 | 8 => all_hex(uuid),
        36 => dashed_layout(uuid),
        _ => false,
    }
}

/// Expand a short UUID string to its dashed 128-bit form
///
/// The caller's digits are kept verbatim; an already full UUID comes back unchanged.
///
/// # Errors
/// Returns [`ValidationError::InvalidUuid`] if `uuid` is not a valid UUID string
pub fn to_full_uuid(uuid: &str) -> Result<String, ValidationError> {
    if !validate_uuid(uuid) {
        return Err(ValidationError::InvalidUuid { field: "uuid" });
    }
    Ok(match uuid.len() {
        4 => format!("0000{uuid}{BASE_UUID_SUFFIX}"),
        8 => format!("{uuid}{BASE_UUID_SUFFIX}"),
        _ => String::from(uuid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("1101"));
        assert!(validate_uuid("0000110a"));
        assert!(validate_uuid("94f39d29-7d6d-437d-973b-fba39e49d4ee"));
        assert!(validate_uuid("00001101-0000-1000-8000-00805F9B34FB"));

        assert!(!validate_uuid("zzzz"));
        assert!(!validate_uuid("110"));
        assert!(!validate_uuid("+101"));
        assert!(!validate_uuid("bad"));
        assert!(!validate_uuid("94f39d297d6d437d973bfba39e49d4ee"));
        assert!(!validate_uuid("94f39d2-97d6d-437d-973b-fba39e49d4ee"));
        assert!(!validate_uuid("94f39d29-7d6d-437d-973b-fba39e49d4eg"));
    }

    #[test]
    fn test_to_full_uuid() {
        assert_eq!(
            to_full_uuid("1101").unwrap(),
            "00001101-0000-1000-8000-00805F9B34FB"
        );
        assert_eq!(
            to_full_uuid("00001101").unwrap(),
            "00001101-0000-1000-8000-00805F9B34FB"
        );

        let full = to_full_uuid("1101").unwrap();
        assert_eq!(to_full_uuid(&full).unwrap(), full);

        assert_eq!(
            to_full_uuid("zzzz"),
            Err(ValidationError::InvalidUuid { field: "uuid" })
        );
    }

    #[test]
    fn test_parse_widths() {
        assert_eq!(
            BluetoothUuid::parse("1101"),
            Ok(BluetoothUuid::Uuid16(0x1101))
        );
        assert_eq!(
            BluetoothUuid::parse("00001101"),
            Ok(BluetoothUuid::Uuid32(0x1101))
        );
        assert_eq!(
            BluetoothUuid::parse("00001101-0000-1000-8000-00805F9B34FB"),
            Ok(BluetoothUuid::Uuid128(0x0000_1101_0000_1000_8000_0080_5F9B_34FB))
        );
        assert!(BluetoothUuid::parse("bad").is_err());
    }

    #[test]
    fn test_base_uuid_expansion() {
        let short = BluetoothUuid::Uuid16(0x1101);
        let full = BluetoothUuid::parse("00001101-0000-1000-8000-00805f9b34fb").unwrap();

        assert_eq!(short.to_u128(), full.to_u128());
        assert!(short.equivalent(&full));
        assert_ne!(short, full);
        assert_eq!(short.to_full(), full);
    }

    #[test]
    fn test_display() {
        assert_eq!(BluetoothUuid::Uuid16(0x110a).to_string(), "110A");
        assert_eq!(BluetoothUuid::Uuid32(0x1101).to_string(), "00001101");
        assert_eq!(
            BluetoothUuid::parse("94f39d29-7d6d-437d-973b-fba39e49d4ee")
                .unwrap()
                .to_string(),
            "94F39D29-7D6D-437D-973B-FBA39E49D4EE"
        );
    }
}
