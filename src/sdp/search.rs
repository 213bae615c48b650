//! Service search
//!
//! [`ServiceSearch`] abstracts the SDP client transport: given a device and a
//! UUID it returns the matching records as encoded attribute lists.
//! [`find_service`] runs that query over a set of devices and projects every
//! record onto a [`ServiceInfo`].

use super::PUBLIC_BROWSE_GROUP_UUID;
use super::record::{ServiceInfo, parse_service_record};
use super::registry::ServiceRegistry;
use crate::address::BluetoothAddress;
use crate::error::{Result, TransportError};
use crate::uuid::BluetoothUuid;
use alloc::vec::Vec;

/// Source of encoded service records
pub trait ServiceSearch {
    /// Fetch every record on `address` that mentions `uuid`
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the device could not be queried
    fn search(
        &mut self,
        address: &BluetoothAddress,
        uuid: &BluetoothUuid,
    ) -> core::result::Result<Vec<Vec<u8>>, TransportError>;
}

impl<T: ServiceSearch + ?Sized> ServiceSearch for &mut T {
    fn search(
        &mut self,
        address: &BluetoothAddress,
        uuid: &BluetoothUuid,
    ) -> core::result::Result<Vec<Vec<u8>>, TransportError> {
        (**self).search(address, uuid)
    }
}

/// Searching a registry answers for the local host, whatever the address
impl ServiceSearch for ServiceRegistry {
    fn search(
        &mut self,
        _address: &BluetoothAddress,
        uuid: &BluetoothUuid,
    ) -> core::result::Result<Vec<Vec<u8>>, TransportError> {
        Ok(ServiceRegistry::search(self, uuid)
            .map(|service| service.record().to_bytes())
            .collect())
    }
}

/// Find services on `addresses`
///
/// `uuid` defaults to the Public Browse Group, which every advertised record
/// belongs to. Devices that cannot be queried are skipped. When `name` is given
/// only records with exactly that service name are kept.
///
/// # Errors
/// Returns [`crate::Error::Validation`] for a malformed `uuid` (before any
/// query is made) and [`crate::Error::Decode`] if a returned record is malformed
pub fn find_service<S: ServiceSearch>(
    search: &mut S,
    addresses: &[BluetoothAddress],
    name: Option<&str>,
    uuid: Option<&str>,
) -> Result<Vec<ServiceInfo>> {
    let uuid = match uuid {
        Some(uuid) => BluetoothUuid::parse(uuid)?,
        None => PUBLIC_BROWSE_GROUP_UUID,
    }
    .to_full();

    let mut services = Vec::new();
    for address in addresses {
        let records = match search.search(address, &uuid) {
            Ok(records) => records,
            Err(err) => {
                warn!("[SDP] skipping {}: {}", address, err);
                continue;
            }
        };
        debug!("[SDP] {} returned {} records", address, records.len());

        for raw in &records {
            let mut info = parse_service_record(raw)?;
            if name.is_some_and(|name| info.name.as_deref() != Some(name)) {
                continue;
            }
            info.host = Some(*address);
            services.push(info);
        }
    }
    Ok(services)
}
