use crate::constants::BD_ADDR_LENGTH;
use crate::error::ValidationError;
use core::fmt;
use core::str::FromStr;

/// A Bluetooth Device Address (`BD_ADDR`) wrapper for type safety
///
/// Bytes are held most significant first, the order they are written in
/// `AA:BB:CC:DD:EE:FF`. HCI packets carry them least significant first; use
/// [`BluetoothAddress::from_wire`] and [`BluetoothAddress::to_wire`] at that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BluetoothAddress(pub [u8; BD_ADDR_LENGTH]);

impl BluetoothAddress {
    /// Create a new Bluetooth address from bytes, most significant first
    #[must_use]
    pub const fn new(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }

    /// Get the raw address bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BD_ADDR_LENGTH] {
        &self.0
    }

    /// Build an address from its HCI wire representation (least significant byte first)
    ///
    /// # Errors
    /// Returns an error if `bytes` is not exactly six bytes long
    pub fn from_wire(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != BD_ADDR_LENGTH {
            return Err(ValidationError::InvalidAddress);
        }
        let mut addr = [0u8; BD_ADDR_LENGTH];
        for (dst, src) in addr.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }
        Ok(Self(addr))
    }

    /// HCI wire representation (least significant byte first)
    #[must_use]
    pub fn to_wire(&self) -> [u8; BD_ADDR_LENGTH] {
        let mut wire = self.0;
        wire.reverse();
        wire
    }

    /// Format the address as a colon-separated uppercase hex string
    #[must_use]
    pub fn format_hex(&self) -> heapless::String<17> {
        const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

        let mut result = heapless::String::new();
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                result.push(':').ok();
            }
            result.push(HEX_CHARS[(byte >> 4) as usize] as char).ok();
            result.push(HEX_CHARS[(byte & 0x0F) as usize] as char).ok();
        }
        result
    }

    /// Parse a Bluetooth address from six hex pairs separated by `:` or `-`
    ///
    /// # Errors
    /// Returns an error if the string is not exactly 17 characters long, a pair is
    /// not hexadecimal, or the separators are not all `:` or all `-`
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let raw = hex.as_bytes();
        if raw.len() != 17 {
            return Err(ValidationError::InvalidAddress);
        }
        let separator = raw[2];
        if !matches!(separator, b':' | b'-') {
            return Err(ValidationError::InvalidAddress);
        }

        let mut bytes = [0u8; BD_ADDR_LENGTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let offset = i * 3;
            if i > 0 && raw[offset - 1] != separator {
                return Err(ValidationError::InvalidAddress);
            }
            *byte = (hex_value(raw[offset])? << 4) | hex_value(raw[offset + 1])?;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Result<u8, ValidationError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ValidationError::InvalidAddress),
    }
}

/// Check that `address` is six 2-digit hex groups separated by `:` or `-` (any case),
/// using the same separator throughout
#[must_use]
pub fn validate_address(address: &str) -> bool {
    BluetoothAddress::from_hex(address).is_ok()
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_hex())
    }
}

impl FromStr for BluetoothAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; BD_ADDR_LENGTH]> for BluetoothAddress {
    fn from(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }
}

impl From<BluetoothAddress> for [u8; BD_ADDR_LENGTH] {
    fn from(addr: BluetoothAddress) -> Self {
        addr.0
    }
}

impl From<BluetoothAddress> for heapless::String<17> {
    fn from(addr: BluetoothAddress) -> Self {
        addr.format_hex()
    }
}

impl TryFrom<&str> for BluetoothAddress {
    type Error = ValidationError;

    fn try_from(hex: &str) -> Result<Self, Self::Error> {
        BluetoothAddress::from_hex(hex)
    }
}

impl TryFrom<&[u8]> for BluetoothAddress {
    type Error = ValidationError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let addr: [u8; BD_ADDR_LENGTH] = bytes
            .try_into()
            .map_err(|_| ValidationError::InvalidAddress)?;
        Ok(BluetoothAddress(addr))
    }
}
