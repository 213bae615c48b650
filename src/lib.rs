#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

extern crate alloc;

mod fmt;

mod address;
mod class_of_device;
pub mod constants;
mod device;
mod error;
pub mod hci;
pub mod inquiry;
pub mod sdp;
pub mod transport;
mod uuid;

pub use address::{BluetoothAddress, validate_address};
pub use class_of_device::{ClassOfDevice, MajorDeviceClass, MajorServiceClass};
pub use device::{DeviceName, DiscoveredDevice};
pub use error::{DecodeError, Error, EventError, Result, TransportError, ValidationError};
pub use inquiry::{
    DeviceDiscoverer, DiscoveryEvent, DiscoveryListener, InquiryOptions, InquiryState,
    discover_devices, lookup_name,
};
pub use sdp::{
    Endpoint, ServiceDefinition, ServiceHandle, ServiceInfo, ServiceProtocol, ServiceRegistry,
    ServiceSearch, find_service,
};
pub use transport::{RawHandle, Transport};
pub use uuid::{BASE_UUID, BluetoothUuid, to_full_uuid, validate_uuid};

/// Build a service record for `definition` and register it in `registry`
///
/// Every field is validated before anything is registered.
///
/// # Errors
/// Returns [`Error::Validation`] for malformed UUIDs or profile versions and
/// [`Error::AlreadyAdvertised`] if the endpoint already carries a record
///
/// # Example
///
/// ```rust
/// use bluejay::{Endpoint, ServiceDefinition, ServiceRegistry, advertise_service};
///
/// let mut registry = ServiceRegistry::new();
/// let definition = ServiceDefinition::new("SampleServer", Endpoint::Rfcomm(1))
///     .with_service_class("1101");
/// let handle = advertise_service(&mut registry, &definition)?;
/// assert!(registry.get(handle).is_some());
/// # Ok::<(), bluejay::Error>(())
/// ```
pub fn advertise_service(
    registry: &mut ServiceRegistry,
    definition: &ServiceDefinition,
) -> Result<ServiceHandle> {
    registry.advertise(definition)
}

/// Withdraw a record registered with [`advertise_service`]
///
/// # Errors
/// Returns [`Error::NotAdvertised`] if `handle` is not registered
pub fn stop_advertising(registry: &mut ServiceRegistry, handle: ServiceHandle) -> Result<()> {
    registry.stop_advertising(handle)
}
