//! Service Discovery Protocol (SDP)
//!
//! Data element codec, service record building and parsing, a registry of
//! locally advertised services, and service search over a pluggable transport.

use crate::uuid::BluetoothUuid;

pub mod attribute;
pub mod codec;
pub mod element;
pub mod record;
pub mod registry;
pub mod search;

// Re-export commonly used types
pub use attribute::{AttributeEntry, AttributeId, universal_attributes};
pub use codec::{decode, encode, encoded_len};
pub use element::{DataElement, DataElementSize, DataElementType};
pub use record::{
    Endpoint, ServiceDefinition, ServiceInfo, ServiceProtocol, ServiceRecord, build_service_record,
    parse_service_record,
};
pub use registry::{AdvertisedService, ServiceHandle, ServiceRegistry};
pub use search::{ServiceSearch, find_service};

/// SDP protocol UUID
pub const SDP_UUID: BluetoothUuid = BluetoothUuid::Uuid16(0x0001);

/// RFCOMM protocol UUID
pub const RFCOMM_UUID: BluetoothUuid = BluetoothUuid::Uuid16(0x0003);

/// OBEX protocol UUID
pub const OBEX_UUID: BluetoothUuid = BluetoothUuid::Uuid16(0x0008);

/// L2CAP protocol UUID
pub const L2CAP_UUID: BluetoothUuid = BluetoothUuid::Uuid16(0x0100);

/// Public Browse Group UUID, the root every advertised record is listed under
pub const PUBLIC_BROWSE_GROUP_UUID: BluetoothUuid = BluetoothUuid::Uuid16(0x1002);

/// Standard Bluetooth Service Classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ServiceClassId {
    /// SDP Server Service
    ServiceDiscoveryServer = 0x1000,
    /// Browse Group Descriptor
    BrowseGroupDescriptor = 0x1001,
    /// Serial Port Profile
    SerialPort = 0x1101,
    /// LAN Access Using PPP
    LanAccessPpp = 0x1102,
    /// Dialup Networking
    DialupNetworking = 0x1103,
    /// Object Push Profile
    ObjectPush = 0x1105,
    /// File Transfer Profile
    FileTransfer = 0x1106,
    /// Headset Profile
    Headset = 0x1108,
    /// Audio Source
    AudioSource = 0x110A,
    /// Audio Sink
    AudioSink = 0x110B,
    /// A/V Remote Control Target
    AvRemoteControlTarget = 0x110C,
    /// Advanced Audio Distribution Profile
    AdvancedAudioDistribution = 0x110D,
    /// A/V Remote Control
    AvRemoteControl = 0x110E,
    /// Hands-Free Profile
    HandsFree = 0x111E,
    /// Hands-Free Audio Gateway
    HandsFreeAudioGateway = 0x111F,
    /// Human Interface Device
    HumanInterfaceDevice = 0x1124,
}

impl ServiceClassId {
    /// 16-bit UUID of this service class
    #[must_use]
    pub const fn uuid(self) -> BluetoothUuid {
        BluetoothUuid::Uuid16(self as u16)
    }

    /// Match a UUID of any width against the known classes
    #[must_use]
    pub fn from_uuid(uuid: &BluetoothUuid) -> Option<Self> {
        let full = uuid.to_u128();
        if full & 0xFFFF_FFFF_FFFF_FFFF_FFFF_FFFF != crate::uuid::BASE_UUID {
            return None;
        }
        let short = u16::try_from(full >> 96).ok()?;
        match short {
            0x1000 => Some(Self::ServiceDiscoveryServer),
            0x1001 => Some(Self::BrowseGroupDescriptor),
            0x1101 => Some(Self::SerialPort),
            0x1102 => Some(Self::LanAccessPpp),
            0x1103 => Some(Self::DialupNetworking),
            0x1105 => Some(Self::ObjectPush),
            0x1106 => Some(Self::FileTransfer),
            0x1108 => Some(Self::Headset),
            0x110A => Some(Self::AudioSource),
            0x110B => Some(Self::AudioSink),
            0x110C => Some(Self::AvRemoteControlTarget),
            0x110D => Some(Self::AdvancedAudioDistribution),
            0x110E => Some(Self::AvRemoteControl),
            0x111E => Some(Self::HandsFree),
            0x111F => Some(Self::HandsFreeAudioGateway),
            0x1124 => Some(Self::HumanInterfaceDevice),
            _ => None,
        }
    }

    /// Get service name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ServiceDiscoveryServer => "Service Discovery Server",
            Self::BrowseGroupDescriptor => "Browse Group Descriptor",
            Self::SerialPort => "Serial Port",
            Self::LanAccessPpp => "LAN Access Using PPP",
            Self::DialupNetworking => "Dialup Networking",
            Self::ObjectPush => "Object Push",
            Self::FileTransfer => "File Transfer",
            Self::Headset => "Headset",
            Self::AudioSource => "Audio Source",
            Self::AudioSink => "Audio Sink",
            Self::AvRemoteControlTarget => "A/V Remote Control Target",
            Self::AdvancedAudioDistribution => "Advanced Audio Distribution",
            Self::AvRemoteControl => "A/V Remote Control",
            Self::HandsFree => "Hands-Free",
            Self::HandsFreeAudioGateway => "Hands-Free Audio Gateway",
            Self::HumanInterfaceDevice => "Human Interface Device",
        }
    }
}

impl From<ServiceClassId> for BluetoothUuid {
    fn from(class: ServiceClassId) -> Self {
        class.uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_class_uuid() {
        let audio_source = ServiceClassId::AudioSource;
        assert_eq!(audio_source.uuid(), BluetoothUuid::Uuid16(0x110A));
        assert_eq!(
            audio_source.uuid().to_u128(),
            0x0000_110A_0000_1000_8000_0080_5F9B_34FB
        );
    }

    #[test]
    fn test_service_class_from_uuid() {
        assert_eq!(
            ServiceClassId::from_uuid(&BluetoothUuid::Uuid16(0x1101)),
            Some(ServiceClassId::SerialPort)
        );
        assert_eq!(
            ServiceClassId::from_uuid(&BluetoothUuid::Uuid16(0x1101).to_full()),
            Some(ServiceClassId::SerialPort)
        );
        assert_eq!(
            ServiceClassId::from_uuid(&BluetoothUuid::Uuid32(0x0001_1101)),
            None
        );
        assert_eq!(
            ServiceClassId::from_uuid(&BluetoothUuid::Uuid128(0x1101)),
            None
        );
        assert_eq!(ServiceClassId::HandsFree.name(), "Hands-Free");
    }
}
