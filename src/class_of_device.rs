//! Class of Device (`CoD`)
//!
//! 24-bit field reported in every inquiry response:
//! - Major Service Classes (bits 23-13)
//! - Major Device Class (bits 12-8)
//! - Minor Device Class (bits 7-2)
//! - Format Type (bits 1-0, always 0b00)
//!
//! On the wire it is three bytes, least significant first.

use crate::constants::CLASS_OF_DEVICE_LENGTH;
use core::fmt;

/// Class of Device indicating device type and capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassOfDevice(u32);

impl ClassOfDevice {
    /// Create a `ClassOfDevice` from a raw value, keeping the low 24 bits
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & 0x00FF_FFFF)
    }

    /// Decode the three wire bytes (least significant first)
    #[must_use]
    pub const fn from_bytes(bytes: [u8; CLASS_OF_DEVICE_LENGTH]) -> Self {
        Self(((bytes[2] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[0] as u32)
    }

    /// Get the raw 24-bit value
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Get the Major Device Class (bits 12-8)
    #[must_use]
    pub const fn major_device_class(&self) -> MajorDeviceClass {
        MajorDeviceClass::from_raw(((self.0 >> 8) & 0x1F) as u8)
    }

    /// Get the Minor Device Class (bits 7-2)
    #[must_use]
    pub const fn minor_device_class(&self) -> u8 {
        ((self.0 >> 2) & 0x3F) as u8
    }

    /// Get the Major Service Classes bit field (bits 23-13)
    #[must_use]
    pub const fn major_service_classes(&self) -> u16 {
        ((self.0 >> 13) & 0x7FF) as u16
    }

    /// Whether the device advertises `service`
    #[must_use]
    pub const fn has_service(&self, service: MajorServiceClass) -> bool {
        self.major_service_classes() & service as u16 != 0
    }

    /// Iterate over the advertised major service classes
    pub fn services(&self) -> impl Iterator<Item = MajorServiceClass> + '_ {
        MajorServiceClass::ALL
            .iter()
            .copied()
            .filter(|service| self.has_service(*service))
    }
}

impl From<[u8; CLASS_OF_DEVICE_LENGTH]> for ClassOfDevice {
    fn from(bytes: [u8; CLASS_OF_DEVICE_LENGTH]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for ClassOfDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.major_device_class();
        f.write_str(major.description())?;
        if let Some(minor) = major.minor_class_description(self.minor_device_class()) {
            write!(f, " ({minor})")?;
        }
        for (i, service) in self.services().enumerate() {
            f.write_str(if i == 0 { " - Services: " } else { ", " })?;
            f.write_str(service.description())?;
        }
        Ok(())
    }
}

/// Major Device Class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MajorDeviceClass {
    /// Miscellaneous devices
    Miscellaneous,
    /// Desktop, laptop, server and similar
    Computer,
    /// Cellular, cordless and smart phones
    Phone,
    /// LAN/Network Access Point
    LanNetworkAccessPoint,
    /// Headsets, speakers, microphones and similar
    AudioVideo,
    /// Keyboards, mice, game controllers
    Peripheral,
    /// Displays, cameras, scanners, printers
    Imaging,
    /// Watches, glasses and similar
    Wearable,
    /// Toys
    Toy,
    /// Health devices
    Health,
    /// Uncategorized devices
    Uncategorized,
    /// Reserved value
    Reserved(u8),
}

impl MajorDeviceClass {
    /// Create from the raw 5-bit value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Miscellaneous,
            0x01 => Self::Computer,
            0x02 => Self::Phone,
            0x03 => Self::LanNetworkAccessPoint,
            0x04 => Self::AudioVideo,
            0x05 => Self::Peripheral,
            0x06 => Self::Imaging,
            0x07 => Self::Wearable,
            0x08 => Self::Toy,
            0x09 => Self::Health,
            0x1F => Self::Uncategorized,
            other => Self::Reserved(other),
        }
    }

    /// Get human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Miscellaneous => "Miscellaneous",
            Self::Computer => "Computer",
            Self::Phone => "Phone",
            Self::LanNetworkAccessPoint => "LAN/Network Access Point",
            Self::AudioVideo => "Audio/Video",
            Self::Peripheral => "Peripheral",
            Self::Imaging => "Imaging",
            Self::Wearable => "Wearable",
            Self::Toy => "Toy",
            Self::Health => "Health",
            Self::Uncategorized => "Uncategorized",
            Self::Reserved(_) => "Reserved",
        }
    }

    /// Minor class description, for the major classes with a simple minor table
    #[must_use]
    pub const fn minor_class_description(&self, minor: u8) -> Option<&'static str> {
        match (self, minor) {
            (Self::Computer, 0x01) => Some("Desktop workstation"),
            (Self::Computer, 0x02) => Some("Server-class computer"),
            (Self::Computer, 0x03) => Some("Laptop"),
            (Self::Computer, 0x04) => Some("Handheld PC/PDA"),
            (Self::Computer, 0x05) => Some("Palm-sized PC/PDA"),
            (Self::Computer, 0x06) => Some("Wearable computer"),
            (Self::Computer, 0x07) => Some("Tablet"),
            (Self::Phone, 0x01) => Some("Cellular"),
            (Self::Phone, 0x02) => Some("Cordless"),
            (Self::Phone, 0x03) => Some("Smartphone"),
            (Self::Phone, 0x04) => Some("Wired modem or voice gateway"),
            (Self::AudioVideo, 0x01) => Some("Wearable headset device"),
            (Self::AudioVideo, 0x02) => Some("Hands-free device"),
            (Self::AudioVideo, 0x04) => Some("Microphone"),
            (Self::AudioVideo, 0x05) => Some("Loudspeaker"),
            (Self::AudioVideo, 0x06) => Some("Headphones"),
            (Self::AudioVideo, 0x07) => Some("Portable audio"),
            (Self::AudioVideo, 0x08) => Some("Car audio"),
            (Self::AudioVideo, 0x0A) => Some("HiFi audio device"),
            (Self::Wearable, 0x01) => Some("Wristwatch"),
            (Self::Wearable, 0x05) => Some("Glasses"),
            _ => None,
        }
    }
}

/// Major Service Class bits (relative to bit 13 of the `CoD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum MajorServiceClass {
    /// Limited Discoverable Mode
    LimitedDiscoverable = 0x001,
    /// Positioning (location identification)
    Positioning = 0x008,
    /// Networking (LAN, ad hoc)
    Networking = 0x010,
    /// Rendering (printing, speakers)
    Rendering = 0x020,
    /// Capturing (scanner, microphone)
    Capturing = 0x040,
    /// Object Transfer
    ObjectTransfer = 0x080,
    /// Audio
    Audio = 0x100,
    /// Telephony
    Telephony = 0x200,
    /// Information (web server, WAP server)
    Information = 0x400,
}

impl MajorServiceClass {
    /// Every service class bit, lowest first
    pub const ALL: [Self; 9] = [
        Self::LimitedDiscoverable,
        Self::Positioning,
        Self::Networking,
        Self::Rendering,
        Self::Capturing,
        Self::ObjectTransfer,
        Self::Audio,
        Self::Telephony,
        Self::Information,
    ];

    /// Get human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::LimitedDiscoverable => "Limited Discoverable",
            Self::Positioning => "Positioning",
            Self::Networking => "Networking",
            Self::Rendering => "Rendering",
            Self::Capturing => "Capturing",
            Self::ObjectTransfer => "Object Transfer",
            Self::Audio => "Audio",
            Self::Telephony => "Telephony",
            Self::Information => "Information",
        }
    }
}
