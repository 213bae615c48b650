//! Devices found by an inquiry

use crate::address::BluetoothAddress;
use crate::class_of_device::ClassOfDevice;
use crate::constants::MAX_DEVICE_NAME_LENGTH;
use crate::hci::eir::ExtendedInquiryResponse;
use crate::hci::event::InquiryResponse;
use core::fmt;
use heapless::Vec;

/// User-friendly device name as reported by the device
///
/// Holds the bytes up to the first NUL. They are usually UTF-8 but nothing
/// guarantees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceName(Vec<u8, MAX_DEVICE_NAME_LENGTH>);

impl DeviceName {
    /// Take a name from raw bytes, stopping at the first NUL or after 248 bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let end = bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(bytes.len())
            .min(MAX_DEVICE_NAME_LENGTH);
        let mut name = Vec::new();
        name.extend_from_slice(&bytes[..end]).ok();
        Self(name)
    }

    /// Raw name bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as text, if it is valid UTF-8
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    /// Whether the name is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for DeviceName {
    fn from(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }
}

/// A device reported by the inquiry engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Bluetooth device address (`BD_ADDR`)
    pub address: BluetoothAddress,
    /// Class of Device, unless class lookup was disabled
    pub class_of_device: Option<ClassOfDevice>,
    /// Received Signal Strength Indicator (RSSI) in dBm, if the result carried one
    pub rssi: Option<i8>,
    /// Name from a remote name request or the EIR complete-name field
    pub name: Option<DeviceName>,
    /// Extended Inquiry Response block, for extended results
    pub eir: Option<ExtendedInquiryResponse>,
}

impl DiscoveredDevice {
    /// Create a new device with only an address
    #[must_use]
    pub const fn new(address: BluetoothAddress) -> Self {
        Self {
            address,
            class_of_device: None,
            rssi: None,
            name: None,
            eir: None,
        }
    }

    /// Update device with new RSSI information
    #[must_use]
    pub fn with_rssi(mut self, rssi: i8) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Update device with a Class of Device
    #[must_use]
    pub fn with_class_of_device(mut self, class_of_device: ClassOfDevice) -> Self {
        self.class_of_device = Some(class_of_device);
        self
    }

    /// Update device with new name information
    #[must_use]
    pub fn with_name(mut self, name: DeviceName) -> Self {
        self.name = Some(name);
        self
    }

    /// Name as text, if present and valid UTF-8
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().and_then(DeviceName::as_str)
    }
}

impl From<&InquiryResponse> for DiscoveredDevice {
    fn from(response: &InquiryResponse) -> Self {
        Self {
            address: response.address,
            class_of_device: Some(response.class_of_device),
            rssi: response.rssi,
            name: response
                .eir
                .as_ref()
                .and_then(ExtendedInquiryResponse::local_name)
                .map(DeviceName::from_bytes),
            eir: response.eir.clone(),
        }
    }
}
