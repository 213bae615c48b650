//! Local service registry
//!
//! Holds the service records this host advertises, keyed by handle, and hands
//! out free RFCOMM channels and L2CAP PSMs for new services.

use super::attribute::universal_attributes::SERVICE_RECORD_HANDLE;
use super::element::DataElement;
use super::record::{
    Endpoint, ServiceDefinition, ServiceInfo, ServiceProtocol, ServiceRecord, build_service_record,
};
use crate::constants::{
    FIRST_SERVICE_HANDLE, L2CAP_FIRST_DYNAMIC_PSM, L2CAP_LAST_DYNAMIC_PSM, RFCOMM_FIRST_CHANNEL,
    RFCOMM_LAST_CHANNEL,
};
use crate::error::{Error, Result};
use crate::uuid::BluetoothUuid;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

/// Service record handle type
pub type ServiceHandle = u32;

/// A service registered with a [`ServiceRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisedService {
    handle: ServiceHandle,
    endpoint: Endpoint,
    record: ServiceRecord,
    raw: Vec<u8>,
}

impl AdvertisedService {
    /// Handle assigned at registration
    #[must_use]
    pub const fn handle(&self) -> ServiceHandle {
        self.handle
    }

    /// Endpoint the service listens on
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Stored record, including its handle attribute
    #[must_use]
    pub const fn record(&self) -> &ServiceRecord {
        &self.record
    }

    /// Record bytes exactly as built from the definition
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Projection of the stored record
    #[must_use]
    pub fn info(&self) -> ServiceInfo {
        self.record.info()
    }
}

/// Registry of locally advertised services
#[derive(Debug)]
pub struct ServiceRegistry {
    services: BTreeMap<ServiceHandle, AdvertisedService>,
    next_handle: ServiceHandle,
    allocated: BTreeSet<Endpoint>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            services: BTreeMap::new(),
            next_handle: FIRST_SERVICE_HANDLE,
            allocated: BTreeSet::new(),
        }
    }

    /// Build and register the record for `definition`
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an invalid definition and
    /// [`Error::AlreadyAdvertised`] if its endpoint already has a record
    pub fn advertise(&mut self, definition: &ServiceDefinition) -> Result<ServiceHandle> {
        let mut record = build_service_record(definition)?;

        if self.is_advertised(definition.endpoint) {
            warn!("[SDP] endpoint already has a service record");
            return Err(Error::AlreadyAdvertised);
        }

        let raw = record.to_bytes();
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        record.set(SERVICE_RECORD_HANDLE, DataElement::UnsignedInt32(handle));

        self.services.insert(
            handle,
            AdvertisedService {
                handle,
                endpoint: definition.endpoint,
                record,
                raw,
            },
        );
        info!("[SDP] advertised service record {:#x}", handle);
        Ok(handle)
    }

    /// Remove an advertised record
    ///
    /// # Errors
    /// Returns [`Error::NotAdvertised`] if no record has `handle`
    pub fn stop_advertising(&mut self, handle: ServiceHandle) -> Result<()> {
        if self.services.remove(&handle).is_none() {
            return Err(Error::NotAdvertised);
        }
        info!("[SDP] withdrew service record {:#x}", handle);
        Ok(())
    }

    /// Look up an advertised service by handle
    #[must_use]
    pub fn get(&self, handle: ServiceHandle) -> Option<&AdvertisedService> {
        self.services.get(&handle)
    }

    /// All advertised services, by ascending handle
    pub fn records(&self) -> impl Iterator<Item = &AdvertisedService> {
        self.services.values()
    }

    /// Advertised services whose record mentions `uuid`
    pub fn search<'a>(
        &'a self,
        uuid: &'a BluetoothUuid,
    ) -> impl Iterator<Item = &'a AdvertisedService> + 'a {
        self.services
            .values()
            .filter(move |service| service.record.contains_uuid(uuid))
    }

    /// Whether a record is registered on `endpoint`
    #[must_use]
    pub fn is_advertised(&self, endpoint: Endpoint) -> bool {
        self.services.values().any(|s| s.endpoint == endpoint)
    }

    /// Reserve the first free port for `protocol`
    ///
    /// RFCOMM channels come from 1..=30; L2CAP PSMs are the odd values in
    /// 0x1001..=0x7FFF. Ports with an advertised record count as taken.
    ///
    /// # Errors
    /// Returns [`Error::NoFreePort`] when the range is exhausted or the
    /// protocol has no allocatable ports
    pub fn allocate_port(&mut self, protocol: ServiceProtocol) -> Result<Endpoint> {
        let candidate = match protocol {
            ServiceProtocol::Rfcomm => self.first_free(
                (RFCOMM_FIRST_CHANNEL..=RFCOMM_LAST_CHANNEL)
                    .filter_map(|channel| u8::try_from(channel).ok())
                    .map(Endpoint::Rfcomm),
            ),
            ServiceProtocol::L2cap => self.first_free(
                (L2CAP_FIRST_DYNAMIC_PSM..=L2CAP_LAST_DYNAMIC_PSM)
                    .step_by(2)
                    .map(Endpoint::L2cap),
            ),
            ServiceProtocol::Unknown => None,
        };

        let endpoint = candidate.ok_or(Error::NoFreePort)?;
        self.allocated.insert(endpoint);
        debug!("[SDP] allocated port {}", endpoint.port());
        Ok(endpoint)
    }

    /// Return a port reserved with [`Self::allocate_port`]
    pub fn release_port(&mut self, endpoint: Endpoint) -> bool {
        self.allocated.remove(&endpoint)
    }

    fn first_free(&self, mut candidates: impl Iterator<Item = Endpoint>) -> Option<Endpoint> {
        candidates
            .find(|endpoint| !self.allocated.contains(endpoint) && !self.is_advertised(*endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::record::parse_service_record;

    fn serial_port(channel: u8) -> ServiceDefinition {
        ServiceDefinition::new("Serial", Endpoint::Rfcomm(channel)).with_service_class("1101")
    }

    #[test]
    fn test_advertise_assigns_handles() {
        let mut registry = ServiceRegistry::new();

        let first = registry.advertise(&serial_port(1)).unwrap();
        let second = registry.advertise(&serial_port(2)).unwrap();
        assert_eq!(first, 0x0001_0000);
        assert_eq!(second, 0x0001_0001);

        let service = registry.get(first).unwrap();
        assert_eq!(service.record().handle(), Some(first));
        assert_eq!(service.info().port, Some(1));

        let raw = parse_service_record(service.raw()).unwrap();
        assert_eq!(raw.handle, None);
        assert_eq!(raw.name.as_deref(), Some("Serial"));
    }

    #[test]
    fn test_advertise_rejects_duplicate_endpoint() {
        let mut registry = ServiceRegistry::new();
        registry.advertise(&serial_port(3)).unwrap();

        assert_eq!(
            registry.advertise(&serial_port(3)),
            Err(Error::AlreadyAdvertised)
        );
        assert_eq!(registry.records().count(), 1);
    }

    #[test]
    fn test_advertise_validates_first() {
        let mut registry = ServiceRegistry::new();
        let bad = serial_port(1).with_service_id("bad");

        assert!(matches!(registry.advertise(&bad), Err(Error::Validation(_))));
        assert_eq!(registry.records().count(), 0);
    }

    #[test]
    fn test_stop_advertising() {
        let mut registry = ServiceRegistry::new();
        let handle = registry.advertise(&serial_port(4)).unwrap();

        assert_eq!(registry.stop_advertising(handle), Ok(()));
        assert!(registry.get(handle).is_none());
        assert_eq!(registry.stop_advertising(handle), Err(Error::NotAdvertised));

        // Endpoint is free again
        assert!(registry.advertise(&serial_port(4)).is_ok());
    }

    #[test]
    fn test_search_by_uuid() {
        let mut registry = ServiceRegistry::new();
        registry.advertise(&serial_port(1)).unwrap();
        let obex =
            ServiceDefinition::new("Obex", Endpoint::L2cap(0x1001)).with_service_class("1105");
        registry.advertise(&obex).unwrap();

        let serial = BluetoothUuid::Uuid16(0x1101);
        assert_eq!(registry.search(&serial).count(), 1);

        let browse = BluetoothUuid::Uuid16(0x1002).to_full();
        assert_eq!(registry.search(&browse).count(), 2);
    }

    #[test]
    fn test_allocate_rfcomm_ports() {
        let mut registry = ServiceRegistry::new();
        registry.advertise(&serial_port(1)).unwrap();

        assert_eq!(
            registry.allocate_port(ServiceProtocol::Rfcomm),
            Ok(Endpoint::Rfcomm(2))
        );
        assert_eq!(
            registry.allocate_port(ServiceProtocol::Rfcomm),
            Ok(Endpoint::Rfcomm(3))
        );

        assert!(registry.release_port(Endpoint::Rfcomm(2)));
        assert_eq!(
            registry.allocate_port(ServiceProtocol::Rfcomm),
            Ok(Endpoint::Rfcomm(2))
        );

        for _ in 4..=30 {
            registry.allocate_port(ServiceProtocol::Rfcomm).unwrap();
        }
        assert_eq!(
            registry.allocate_port(ServiceProtocol::Rfcomm),
            Err(Error::NoFreePort)
        );
    }

    #[test]
    fn test_allocate_l2cap_ports() {
        let mut registry = ServiceRegistry::new();

        assert_eq!(
            registry.allocate_port(ServiceProtocol::L2cap),
            Ok(Endpoint::L2cap(0x1001))
        );
        assert_eq!(
            registry.allocate_port(ServiceProtocol::L2cap),
            Ok(Endpoint::L2cap(0x1003))
        );
        assert_eq!(
            registry.allocate_port(ServiceProtocol::Unknown),
            Err(Error::NoFreePort)
        );
    }
}
