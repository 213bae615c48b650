//! SDP Service Records
//!
//! A service record is an attribute list: a data element sequence alternating
//! `UInt16` attribute ids and their values. [`build_service_record`] produces the
//! record advertised for a local service; [`parse_service_record`] projects a
//! remote record onto a [`ServiceInfo`].

use super::attribute::universal_attributes::{
    BLUETOOTH_PROFILE_DESCRIPTOR_LIST, BROWSE_GROUP_LIST, PROTOCOL_DESCRIPTOR_LIST,
    SERVICE_CLASS_ID_LIST, SERVICE_ID, SERVICE_RECORD_HANDLE,
};
use super::attribute::{AttributeEntry, AttributeId, AttributeListParser, LanguageAttributeOffset};
use super::codec;
use super::element::DataElement;
use super::{L2CAP_UUID, PUBLIC_BROWSE_GROUP_UUID, RFCOMM_UUID, ServiceClassId};
use crate::address::BluetoothAddress;
use crate::error::{DecodeError, ValidationError};
use crate::uuid::BluetoothUuid;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Transport a service listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceProtocol {
    /// RFCOMM server channel
    Rfcomm,
    /// L2CAP PSM
    L2cap,
    /// A protocol stack this crate does not recognize
    Unknown,
}

/// Listening endpoint of a local service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    /// RFCOMM server channel (1..=30)
    Rfcomm(u8),
    /// L2CAP PSM
    L2cap(u16),
}

impl Endpoint {
    /// Protocol of this endpoint
    #[must_use]
    pub const fn protocol(&self) -> ServiceProtocol {
        match self {
            Self::Rfcomm(_) => ServiceProtocol::Rfcomm,
            Self::L2cap(_) => ServiceProtocol::L2cap,
        }
    }

    /// Channel or PSM number
    #[must_use]
    pub const fn port(&self) -> u16 {
        match *self {
            Self::Rfcomm(channel) => channel as u16,
            Self::L2cap(psm) => psm,
        }
    }
}

/// Description of a local service to advertise
///
/// UUIDs are kept as text and validated when the record is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Service name (attribute 0x0100)
    pub name: String,
    /// Service ID UUID (attribute 0x0003)
    pub service_id: Option<String>,
    /// Service class UUIDs (attribute 0x0001)
    pub service_classes: Vec<String>,
    /// Profile UUIDs with their versions (attribute 0x0009)
    pub profiles: Vec<(String, u32)>,
    /// Provider name (attribute 0x0102)
    pub provider: Option<String>,
    /// Service description (attribute 0x0101)
    pub description: Option<String>,
    /// Extra protocol UUIDs appended to the protocol descriptor list
    pub protocols: Vec<String>,
    /// Where the service listens
    pub endpoint: Endpoint,
}

impl ServiceDefinition {
    /// Create a definition with just a name and endpoint
    #[must_use]
    pub fn new(name: &str, endpoint: Endpoint) -> Self {
        Self {
            name: String::from(name),
            service_id: None,
            service_classes: Vec::new(),
            profiles: Vec::new(),
            provider: None,
            description: None,
            protocols: Vec::new(),
            endpoint,
        }
    }

    /// Set the service ID
    #[must_use]
    pub fn with_service_id(mut self, uuid: &str) -> Self {
        self.service_id = Some(String::from(uuid));
        self
    }

    /// Append a service class
    #[must_use]
    pub fn with_service_class(mut self, uuid: &str) -> Self {
        self.service_classes.push(String::from(uuid));
        self
    }

    /// Append a profile descriptor
    #[must_use]
    pub fn with_profile(mut self, uuid: &str, version: u32) -> Self {
        self.profiles.push((String::from(uuid), version));
        self
    }

    /// Set the provider name
    #[must_use]
    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = Some(String::from(provider));
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(String::from(description));
        self
    }

    /// Append a protocol UUID
    #[must_use]
    pub fn with_protocol(mut self, uuid: &str) -> Self {
        self.protocols.push(String::from(uuid));
        self
    }
}

/// An SDP service record: attribute entries in wire order
///
/// Lookups follow the last entry carrying an id, so a record decoded with a
/// repeated attribute reports the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRecord {
    attributes: Vec<AttributeEntry>,
}

impl ServiceRecord {
    /// Create an empty record
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn push(&mut self, id: AttributeId, value: DataElement) {
        self.attributes.push(AttributeEntry::new(id, value));
    }

    /// Replace the value of `id`, or insert it keeping ids ascending
    pub fn set(&mut self, id: AttributeId, value: DataElement) {
        if let Some(entry) = self.attributes.iter_mut().rev().find(|e| e.id == id) {
            entry.value = value;
        } else {
            let index = self.attributes.partition_point(|e| e.id < id);
            let entry = AttributeEntry::new(id, value);
            self.attributes.insert(index, entry);
        }
    }

    /// Get attribute value
    #[must_use]
    pub fn get(&self, id: AttributeId) -> Option<&DataElement> {
        self.attributes
            .iter()
            .rev()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.value)
    }

    /// All attribute entries in order
    #[must_use]
    pub fn attributes(&self) -> &[AttributeEntry] {
        &self.attributes
    }

    /// Number of attribute entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the record has no attributes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Service record handle (attribute 0x0000)
    #[must_use]
    pub fn handle(&self) -> Option<u32> {
        self.get(SERVICE_RECORD_HANDLE)?.as_u32()
    }

    /// Whether `uuid` appears in any attribute value
    #[must_use]
    pub fn contains_uuid(&self, uuid: &BluetoothUuid) -> bool {
        self.attributes
            .iter()
            .any(|entry| entry.value.contains_uuid(uuid))
    }

    /// The record as a single data element sequence
    #[must_use]
    pub fn to_element(&self) -> DataElement {
        let mut items = Vec::with_capacity(self.attributes.len() * 2);
        for entry in &self.attributes {
            items.push(DataElement::UnsignedInt16(entry.id));
            items.push(entry.value.clone());
        }
        DataElement::Sequence(items)
    }

    /// Encode the record
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(&self.to_element())
    }

    /// Build a record from a decoded attribute list
    ///
    /// # Errors
    /// Returns [`DecodeError::UnexpectedElement`] if `element` is not a sequence
    /// of id/value pairs
    pub fn from_element(element: &DataElement) -> Result<Self, DecodeError> {
        let DataElement::Sequence(items) = element else {
            return Err(DecodeError::UnexpectedElement {
                expected: "attribute list sequence",
            });
        };
        let mut record = Self::new();
        let mut parser = AttributeListParser::new(items);
        while let Some(entry) = parser.parse_next()? {
            record.attributes.push(entry);
        }
        Ok(record)
    }

    /// Decode a record from its encoded attribute list
    ///
    /// # Errors
    /// Returns a [`DecodeError`] for malformed bytes or a malformed attribute list
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (element, _) = codec::decode(bytes)?;
        Self::from_element(&element)
    }

    /// Project the record onto a [`ServiceInfo`]
    #[must_use]
    pub fn info(&self) -> ServiceInfo {
        let (protocol, port) = self
            .get(PROTOCOL_DESCRIPTOR_LIST)
            .map_or((None, None), |list| {
                let (protocol, port) = protocol_and_port(list);
                (Some(protocol), port)
            });

        ServiceInfo {
            host: None,
            name: self.text(LanguageAttributeOffset::ServiceName.id()),
            description: self.text(LanguageAttributeOffset::ServiceDescription.id()),
            provider: self.text(LanguageAttributeOffset::ProviderName.id()),
            protocol,
            port,
            service_classes: self
                .get(SERVICE_CLASS_ID_LIST)
                .and_then(DataElement::as_sequence)
                .map(|items| items.iter().filter_map(DataElement::as_uuid).collect())
                .unwrap_or_default(),
            profiles: self
                .get(BLUETOOTH_PROFILE_DESCRIPTOR_LIST)
                .and_then(DataElement::as_sequence)
                .map(|items| items.iter().filter_map(profile_descriptor).collect())
                .unwrap_or_default(),
            service_id: self.get(SERVICE_ID).and_then(DataElement::as_uuid),
            handle: self.handle(),
        }
    }

    fn text(&self, id: AttributeId) -> Option<String> {
        self.get(id)
            .and_then(DataElement::as_bytes)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// RFCOMM channel if the stack has one, otherwise an L2CAP PSM
fn protocol_and_port(list: &DataElement) -> (ServiceProtocol, Option<u16>) {
    let list = match list {
        DataElement::Alternative(choices) => choices.first().unwrap_or(list),
        _ => list,
    };
    let Some(descriptors) = list.as_sequence() else {
        return (ServiceProtocol::Unknown, None);
    };

    let mut psm = None;
    for descriptor in descriptors {
        let Some([protocol, params @ ..]) = descriptor.as_sequence() else {
            continue;
        };
        let Some(uuid) = protocol.as_uuid() else {
            continue;
        };
        let param = params.first().and_then(DataElement::as_u16);
        if uuid.equivalent(&RFCOMM_UUID) {
            if let Some(channel) = param {
                return (ServiceProtocol::Rfcomm, Some(channel));
            }
        } else if uuid.equivalent(&L2CAP_UUID) && psm.is_none() {
            psm = param;
        }
    }

    match psm {
        Some(psm) => (ServiceProtocol::L2cap, Some(psm)),
        None => (ServiceProtocol::Unknown, None),
    }
}

fn profile_descriptor(element: &DataElement) -> Option<(BluetoothUuid, u16)> {
    match element.as_sequence()? {
        [uuid, version, ..] => Some((uuid.as_uuid()?, version.as_u16()?)),
        _ => None,
    }
}

/// Service description projected from a service record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Device the record came from, filled in by the search layer
    pub host: Option<BluetoothAddress>,
    /// Service name
    pub name: Option<String>,
    /// Service description
    pub description: Option<String>,
    /// Provider name
    pub provider: Option<String>,
    /// Protocol, if the record has a protocol descriptor list
    pub protocol: Option<ServiceProtocol>,
    /// RFCOMM channel or L2CAP PSM
    pub port: Option<u16>,
    /// Service class UUIDs
    pub service_classes: Vec<BluetoothUuid>,
    /// Profile UUIDs with versions
    pub profiles: Vec<(BluetoothUuid, u16)>,
    /// Service ID
    pub service_id: Option<BluetoothUuid>,
    /// Service record handle
    pub handle: Option<u32>,
}

impl ServiceInfo {
    /// Names of the service classes this crate knows about
    pub fn service_class_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.service_classes
            .iter()
            .filter_map(ServiceClassId::from_uuid)
            .map(ServiceClassId::name)
    }
}

/// Build the service record advertised for `definition`
///
/// Every UUID and profile version is validated before anything is built. The
/// attributes appear in this order: service id (if set), service classes (if
/// any), protocol descriptor list, browse group list, profile descriptors (if
/// any), name, description (if non-empty), provider (if non-empty).
///
/// # Errors
/// Returns a [`ValidationError`] naming the first invalid field
pub fn build_service_record(
    definition: &ServiceDefinition,
) -> Result<ServiceRecord, ValidationError> {
    let service_id = definition
        .service_id
        .as_deref()
        .map(|uuid| BluetoothUuid::parse_field(uuid, "service_id"))
        .transpose()?;
    let service_classes = definition
        .service_classes
        .iter()
        .map(|uuid| BluetoothUuid::parse_field(uuid, "service_classes"))
        .collect::<Result<Vec<_>, _>>()?;
    let profiles = definition
        .profiles
        .iter()
        .map(|(uuid, version)| {
            let uuid = BluetoothUuid::parse_field(uuid, "profiles")?;
            let version = u16::try_from(*version)
                .map_err(|_| ValidationError::InvalidProfileVersion { version: *version })?;
            Ok((uuid, version))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;
    let protocols = definition
        .protocols
        .iter()
        .map(|uuid| BluetoothUuid::parse_field(uuid, "protocols"))
        .collect::<Result<Vec<_>, _>>()?;

    let mut record = ServiceRecord::new();
    if let Some(service_id) = service_id {
        record.push(SERVICE_ID, DataElement::Uuid(service_id));
    }

    if !service_classes.is_empty() {
        record.push(
            SERVICE_CLASS_ID_LIST,
            DataElement::Sequence(service_classes.into_iter().map(DataElement::Uuid).collect()),
        );
    }

    let mut stack = match definition.endpoint {
        Endpoint::Rfcomm(channel) => vec![
            DataElement::Sequence(vec![DataElement::Uuid(L2CAP_UUID)]),
            DataElement::Sequence(vec![
                DataElement::Uuid(RFCOMM_UUID),
                DataElement::UnsignedInt8(channel),
            ]),
        ],
        Endpoint::L2cap(psm) => vec![DataElement::Sequence(vec![
            DataElement::Uuid(L2CAP_UUID),
            DataElement::UnsignedInt16(psm),
        ])],
    };
    stack.extend(
        protocols
            .into_iter()
            .map(|uuid| DataElement::Sequence(vec![DataElement::Uuid(uuid)])),
    );
    record.push(PROTOCOL_DESCRIPTOR_LIST, DataElement::Sequence(stack));

    record.push(
        BROWSE_GROUP_LIST,
        DataElement::Sequence(vec![DataElement::Uuid(PUBLIC_BROWSE_GROUP_UUID)]),
    );

    if !profiles.is_empty() {
        record.push(
            BLUETOOTH_PROFILE_DESCRIPTOR_LIST,
            DataElement::Sequence(
                profiles
                    .into_iter()
                    .map(|(uuid, version)| {
                        DataElement::Sequence(vec![
                            DataElement::Uuid(uuid),
                            DataElement::UnsignedInt16(version),
                        ])
                    })
                    .collect(),
            ),
        );
    }

    record.push(
        LanguageAttributeOffset::ServiceName.id(),
        DataElement::text_string(&definition.name),
    );
    if let Some(description) = definition.description.as_deref().filter(|d| !d.is_empty()) {
        record.push(
            LanguageAttributeOffset::ServiceDescription.id(),
            DataElement::text_string(description),
        );
    }
    if let Some(provider) = definition.provider.as_deref().filter(|p| !p.is_empty()) {
        record.push(
            LanguageAttributeOffset::ProviderName.id(),
            DataElement::text_string(provider),
        );
    }

    Ok(record)
}

/// Decode an encoded service record and project it onto a [`ServiceInfo`]
///
/// # Errors
/// Returns a [`DecodeError`] for malformed bytes or a top-level element that is
/// not an attribute list
pub fn parse_service_record(bytes: &[u8]) -> Result<ServiceInfo, DecodeError> {
    ServiceRecord::parse(bytes).map(|record| record.info())
}
