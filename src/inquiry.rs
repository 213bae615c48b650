//! Device inquiry
//!
//! [`DeviceDiscoverer`] drives one inquiry session over a [`Transport`]: it
//! sends the Inquiry command, turns inquiry result events into
//! [`DiscoveredDevice`]s and, when asked to, resolves user-friendly names one
//! Remote Name Request at a time before reporting completion.
//!
//! ```text
//! Idle --start--> Inquiring --inquiry complete--> ResolvingNames --queue empty--> Idle
//!                     |                                                        ^
//!                     +---------------- queue empty / rejected ----------------+
//! ```
//!
//! The discoverer never blocks on its own. [`DeviceDiscoverer::process_event`]
//! performs at most one transport read, and [`DeviceDiscoverer::handle_packet`]
//! accepts packets an external event loop has already read.

use crate::address::BluetoothAddress;
use crate::class_of_device::ClassOfDevice;
use crate::constants::{
    DEFAULT_DEVICE_ID, DEFAULT_INQUIRY_DURATION, DEFAULT_PAGE_SCAN_REPETITION_MODE,
    EVENT_BUFFER_SIZE, GIAC, MAX_INQUIRY_RESPONSES, MAX_PENDING_NAMES, MAX_RESOLVED_DEVICES,
};
use crate::device::{DeviceName, DiscoveredDevice};
use crate::error::{Error, Result};
use crate::hci::eir::ExtendedInquiryResponse;
use crate::hci::event::{HciEvent, InquiryResponse};
use crate::hci::{HciCommand, opcodes};
use crate::transport::{RawHandle, Transport};
use alloc::boxed::Box;
use alloc::vec::Vec;
use heapless::FnvIndexSet;

/// Inquiry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InquiryOptions {
    /// Inquiry access code, GIAC by default
    pub lap: u32,
    /// Inquiry length in 1.28 s units
    pub duration: u8,
    /// Responses before the controller ends the inquiry, 0 for unlimited
    pub max_responses: u8,
    /// Resolve names of devices that did not include one in their response
    pub lookup_names: bool,
    /// Report the Class of Device of each result
    pub lookup_class: bool,
    /// Controller to use, -1 for the first available one
    pub device_id: i16,
}

impl Default for InquiryOptions {
    fn default() -> Self {
        Self {
            lap: GIAC,
            duration: DEFAULT_INQUIRY_DURATION,
            max_responses: MAX_INQUIRY_RESPONSES,
            lookup_names: true,
            lookup_class: true,
            device_id: DEFAULT_DEVICE_ID,
        }
    }
}

impl InquiryOptions {
    /// Set the inquiry access code
    #[must_use]
    pub const fn with_lap(mut self, lap: u32) -> Self {
        self.lap = lap;
        self
    }

    /// Set the inquiry length in 1.28 s units
    #[must_use]
    pub const fn with_duration(mut self, duration: u8) -> Self {
        self.duration = duration;
        self
    }

    /// Set the response limit
    #[must_use]
    pub const fn with_max_responses(mut self, max_responses: u8) -> Self {
        self.max_responses = max_responses;
        self
    }

    /// Enable or disable name resolution
    #[must_use]
    pub const fn with_lookup_names(mut self, lookup_names: bool) -> Self {
        self.lookup_names = lookup_names;
        self
    }

    /// Enable or disable Class of Device reporting
    #[must_use]
    pub const fn with_lookup_class(mut self, lookup_class: bool) -> Self {
        self.lookup_class = lookup_class;
        self
    }

    /// Select a controller
    #[must_use]
    pub const fn with_device_id(mut self, device_id: i16) -> Self {
        self.device_id = device_id;
        self
    }
}

/// Where the discoverer is in its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InquiryState {
    /// No session open
    Idle,
    /// The controller is inquiring
    Inquiring,
    /// Inquiry phase over, names still being resolved
    ResolvingNames,
}

/// Output of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A device was found, named if name resolution succeeded
    DeviceDiscovered(DiscoveredDevice),
    /// The session is over; no further events follow
    InquiryComplete,
}

/// Callbacks for [`DeviceDiscoverer::process_inquiry`]
pub trait DiscoveryListener {
    /// Called right before the Inquiry command is sent
    fn pre_inquiry(&mut self) {}

    /// Called once per reported device
    fn device_discovered(&mut self, device: DiscoveredDevice);

    /// Called when the session ends, including after a cancel or rejection
    fn inquiry_complete(&mut self) {}
}

/// A device waiting for its name
#[derive(Debug, Clone)]
struct PendingName {
    address: BluetoothAddress,
    page_scan_repetition_mode: u8,
    clock_offset: u16,
    class_of_device: ClassOfDevice,
    rssi: Option<i8>,
    /// EIR block of an extended result
    eir: Option<Box<ExtendedInquiryResponse>>,
}

impl PendingName {
    fn from_response(response: &InquiryResponse) -> Self {
        Self {
            address: response.address,
            page_scan_repetition_mode: response.page_scan_repetition_mode,
            clock_offset: response.clock_offset,
            class_of_device: response.class_of_device,
            rssi: response.rssi,
            eir: response.eir.clone().map(Box::new),
        }
    }

    fn into_device(self, name: Option<DeviceName>) -> DiscoveredDevice {
        DiscoveredDevice {
            address: self.address,
            class_of_device: Some(self.class_of_device),
            rssi: self.rssi,
            name,
            eir: self.eir.map(|eir| *eir),
        }
    }
}

/// Bookkeeping for one open session
#[derive(Debug)]
struct Session {
    /// FIFO of devices whose name is still unknown
    pending: heapless::Vec<PendingName, MAX_PENDING_NAMES>,
    resolved: FnvIndexSet<BluetoothAddress, MAX_RESOLVED_DEVICES>,
    inquiring: bool,
    /// Inquiry Cancel sent, acknowledgement outstanding
    cancelling: bool,
    /// Name request sent and not yet answered
    in_flight: Option<PendingName>,
    lookup_names: bool,
}

impl Session {
    fn new(lookup_names: bool) -> Self {
        Self {
            pending: heapless::Vec::new(),
            resolved: FnvIndexSet::new(),
            inquiring: true,
            cancelling: false,
            in_flight: None,
            lookup_names,
        }
    }

    fn is_known(&self, address: &BluetoothAddress) -> bool {
        self.resolved.contains(address)
            || self.pending.iter().any(|p| p.address == *address)
            || matches!(&self.in_flight, Some(p) if p.address == *address)
    }

    /// Remove `address` from the in-flight slot or the queue
    fn take(&mut self, address: &BluetoothAddress) -> Option<PendingName> {
        if matches!(&self.in_flight, Some(p) if p.address == *address) {
            return self.in_flight.take();
        }
        let index = self.pending.iter().position(|p| p.address == *address)?;
        Some(self.pending.remove(index))
    }
}

/// HCI inquiry state machine
pub struct DeviceDiscoverer<T: Transport> {
    transport: T,
    options: InquiryOptions,
    session: Option<Session>,
}

impl<T: Transport> DeviceDiscoverer<T> {
    /// Create a discoverer with default options
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, InquiryOptions::default())
    }

    /// Create a discoverer with custom options
    pub fn with_options(transport: T, options: InquiryOptions) -> Self {
        Self {
            transport,
            options,
            session: None,
        }
    }

    /// Options used for the Inquiry command
    pub const fn options(&self) -> &InquiryOptions {
        &self.options
    }

    /// The underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Current state
    pub fn state(&self) -> InquiryState {
        match &self.session {
            None => InquiryState::Idle,
            Some(session) if session.inquiring => InquiryState::Inquiring,
            Some(_) => InquiryState::ResolvingNames,
        }
    }

    /// Whether a session is open
    pub const fn is_inquiring(&self) -> bool {
        self.session.is_some()
    }

    /// Pollable handle of the transport, only while a session is open
    pub fn poll_handle(&self) -> Option<RawHandle> {
        self.session.as_ref().and(self.transport.poll_handle())
    }

    /// Send the Inquiry command and open a session
    ///
    /// `duration` overrides the configured inquiry length. The LAP and
    /// response limit come from [`InquiryOptions`].
    ///
    /// # Errors
    /// Returns [`Error::AlreadyInquiring`] if a session is open, or the
    /// transport error if the command could not be sent
    pub fn start(&mut self, duration: u8, lookup_names: bool) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::AlreadyInquiring);
        }

        info!(
            "[INQUIRY] starting inquiry on device {}, duration {}",
            self.options.device_id, duration
        );
        self.send(HciCommand::Inquiry {
            lap: self.options.lap,
            duration,
            max_responses: self.options.max_responses,
        })?;
        self.session = Some(Session::new(lookup_names));
        Ok(())
    }

    /// Notify `listener` and start a session
    ///
    /// # Errors
    /// Same as [`DeviceDiscoverer::start`]
    pub fn find_devices<L: DiscoveryListener>(
        &mut self,
        listener: &mut L,
        duration: u8,
        lookup_names: bool,
    ) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::AlreadyInquiring);
        }
        listener.pre_inquiry();
        self.start(duration, lookup_names)
    }

    /// Stop the session early
    ///
    /// While the controller is inquiring an Inquiry Cancel is sent and the
    /// completion follows with its acknowledgement. Queued name lookups are
    /// dropped either way; an unanswered name request is still awaited.
    /// If nothing is outstanding the session closes right away and the
    /// completion is returned directly.
    ///
    /// # Errors
    /// Returns the transport error if Inquiry Cancel could not be sent
    pub fn cancel(&mut self) -> Result<Vec<DiscoveryEvent>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };
        session.pending.clear();
        let inquiring = session.inquiring;

        debug!("[INQUIRY] cancelling inquiry");
        if inquiring {
            self.send(HciCommand::InquiryCancel)?;
            if let Some(session) = self.session.as_mut() {
                session.cancelling = true;
            }
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        self.advance(&mut events)?;
        Ok(events)
    }

    /// Read one packet from the transport and process it
    ///
    /// Does not touch the transport when no session is open.
    ///
    /// # Errors
    /// Returns the transport error if reading, or sending a follow-up
    /// command, failed
    pub fn process_event(&mut self) -> Result<Vec<DiscoveryEvent>> {
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        let mut buffer = [0u8; EVENT_BUFFER_SIZE];
        let len = self.transport.recv(&mut buffer)?;
        self.handle_packet(&buffer[..len])
    }

    /// Process one packet that was read elsewhere
    ///
    /// Malformed packets are logged and ignored, as are events that do not
    /// concern the inquiry.
    ///
    /// # Errors
    /// Returns the transport error if a follow-up command could not be sent
    pub fn handle_packet(&mut self, packet: &[u8]) -> Result<Vec<DiscoveryEvent>> {
        let mut events = Vec::new();
        if self.session.is_none() {
            return Ok(events);
        }

        let event = match HciEvent::parse(packet) {
            Ok(event) => event,
            Err(e) => {
                warn!("[INQUIRY] ignoring malformed packet: {}", e);
                return Ok(events);
            }
        };

        match event {
            HciEvent::InquiryResult { responses, .. } => {
                for response in &responses {
                    self.inquiry_response(response, &mut events);
                }
            }
            HciEvent::InquiryComplete { status } => {
                debug!("[INQUIRY] inquiry complete, status {:#x}", status);
                self.end_inquiry_phase(&mut events)?;
            }
            HciEvent::CommandComplete { opcode, .. } if opcode == opcodes::INQUIRY_CANCEL => {
                debug!("[INQUIRY] inquiry cancelled");
                self.end_inquiry_phase(&mut events)?;
            }
            HciEvent::CommandStatus { status, opcode, .. } if status != 0 => {
                warn!(
                    "[INQUIRY] command {:#x} rejected with status {:#x}",
                    opcode, status
                );
                self.session = None;
                events.push(DiscoveryEvent::InquiryComplete);
            }
            HciEvent::RemoteNameRequestComplete {
                status,
                address,
                name,
            } => {
                self.name_resolved(status, address, name, &mut events)?;
            }
            HciEvent::Unknown { code } => {
                trace!("[INQUIRY] ignoring event {:#x}", code);
            }
            _ => {}
        }
        Ok(events)
    }

    /// Drive the session to completion, reporting to `listener`
    ///
    /// Returns immediately if no session is open.
    ///
    /// # Errors
    /// Returns the first transport error; the session stays open
    pub fn process_inquiry<L: DiscoveryListener>(&mut self, listener: &mut L) -> Result<()> {
        while self.session.is_some() {
            for event in self.process_event()? {
                match event {
                    DiscoveryEvent::DeviceDiscovered(device) => listener.device_discovered(device),
                    DiscoveryEvent::InquiryComplete => listener.inquiry_complete(),
                }
            }
        }
        Ok(())
    }

    fn send(&mut self, command: HciCommand) -> Result<()> {
        trace!("[INQUIRY] sending command {:#x}", command.opcode());
        self.transport.send(&command.encode())?;
        Ok(())
    }

    fn inquiry_response(&mut self, response: &InquiryResponse, events: &mut Vec<DiscoveryEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let device = DiscoveredDevice::from(response);
        debug!("[INQUIRY] found {}", device.address);

        if !session.lookup_names || session.cancelling || device.name.is_some() {
            events.push(DiscoveryEvent::DeviceDiscovered(device));
            return;
        }
        if session.is_known(&device.address) {
            return;
        }
        if session
            .pending
            .push(PendingName::from_response(response))
            .is_err()
        {
            warn!(
                "[INQUIRY] name queue full, reporting {} without a name",
                device.address
            );
            events.push(DiscoveryEvent::DeviceDiscovered(device));
        }
    }

    fn end_inquiry_phase(&mut self, events: &mut Vec<DiscoveryEvent>) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            session.inquiring = false;
        }
        self.advance(events)
    }

    fn name_resolved(
        &mut self,
        status: u8,
        address: BluetoothAddress,
        name: DeviceName,
        events: &mut Vec<DiscoveryEvent>,
    ) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let Some(pending) = session.take(&address) else {
            trace!("[INQUIRY] name for unknown device {}", address);
            return Ok(());
        };

        if status == 0 {
            session.resolved.insert(address).ok();
            events.push(DiscoveryEvent::DeviceDiscovered(pending.into_device(Some(name))));
        } else {
            debug!(
                "[INQUIRY] name request for {} failed with status {:#x}",
                address, status
            );
        }
        self.advance(events)
    }

    /// Request the next name, or close the session once nothing is left
    fn advance(&mut self, events: &mut Vec<DiscoveryEvent>) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if session.inquiring || session.in_flight.is_some() {
            return Ok(());
        }
        if session.pending.is_empty() {
            info!("[INQUIRY] inquiry complete");
            self.session = None;
            events.push(DiscoveryEvent::InquiryComplete);
            return Ok(());
        }

        let next = session.pending.remove(0);
        let command = HciCommand::RemoteNameRequest {
            address: next.address,
            page_scan_repetition_mode: next.page_scan_repetition_mode,
            clock_offset: next.clock_offset,
        };
        debug!("[INQUIRY] requesting name of {}", next.address);
        session.in_flight = Some(next);
        self.send(command)
    }
}

/// Run a complete inquiry and collect every device it reports
///
/// # Errors
/// Returns the transport error that ended the session
pub fn discover_devices<T: Transport>(
    transport: T,
    options: &InquiryOptions,
) -> Result<Vec<DiscoveredDevice>> {
    let mut discoverer = DeviceDiscoverer::with_options(transport, *options);
    discoverer.start(options.duration, options.lookup_names)?;

    let mut devices = Vec::new();
    while discoverer.is_inquiring() {
        for event in discoverer.process_event()? {
            if let DiscoveryEvent::DeviceDiscovered(mut device) = event {
                if !options.lookup_class {
                    device.class_of_device = None;
                }
                devices.push(device);
            }
        }
    }
    Ok(devices)
}

/// Ask one device for its user-friendly name, outside of any inquiry
///
/// Sends a single Remote Name Request with page scan repetition mode R2 and
/// no clock offset, then reads until the controller answers for `address`.
/// Returns `None` when the controller rejects the request or the device does
/// not answer successfully.
///
/// # Errors
/// Returns the transport error if sending or reading failed
pub fn lookup_name<T: Transport>(
    mut transport: T,
    address: BluetoothAddress,
) -> Result<Option<DeviceName>> {
    let command = HciCommand::RemoteNameRequest {
        address,
        page_scan_repetition_mode: DEFAULT_PAGE_SCAN_REPETITION_MODE,
        clock_offset: 0,
    };
    debug!("[INQUIRY] requesting name of {}", address);
    transport.send(&command.encode())?;

    let mut buffer = [0u8; EVENT_BUFFER_SIZE];
    loop {
        let len = transport.recv(&mut buffer)?;
        match HciEvent::parse(&buffer[..len]) {
            Ok(HciEvent::CommandStatus { status, opcode, .. })
                if status != 0 && opcode == opcodes::REMOTE_NAME_REQUEST =>
            {
                warn!("[INQUIRY] name request rejected with status {:#x}", status);
                return Ok(None);
            }
            Ok(HciEvent::RemoteNameRequestComplete {
                status,
                address: answered,
                name,
            }) if answered == address => {
                return Ok((status == 0).then_some(name));
            }
            Ok(_) => {}
            Err(e) => warn!("[INQUIRY] ignoring malformed packet: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::hci::event::tests::{
        event, extended_inquiry_result, inquiry_result, inquiry_result_with_rssi,
        remote_name_complete,
    };
    use crate::hci::event_codes;
    use crate::transport::mock::MockTransport;
    use alloc::vec;

    const PHONE: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    const HEADSET: [u8; 6] = [0x11, 0x12, 0x13, 0x14, 0x15, 0x16];

    fn inquiry_complete() -> Vec<u8> {
        event(event_codes::INQUIRY_COMPLETE, &[0x00])
    }

    fn wire(addr: [u8; 6]) -> BluetoothAddress {
        BluetoothAddress::from_wire(&addr).unwrap()
    }

    fn devices(events: &[DiscoveryEvent]) -> Vec<&DiscoveredDevice> {
        events
            .iter()
            .filter_map(|e| match e {
                DiscoveryEvent::DeviceDiscovered(d) => Some(d),
                DiscoveryEvent::InquiryComplete => None,
            })
            .collect()
    }

    fn run(discoverer: &mut DeviceDiscoverer<MockTransport>) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();
        while discoverer.is_inquiring() {
            events.extend(discoverer.process_event().unwrap());
        }
        events
    }

    #[derive(Default)]
    struct Recorder {
        pre_inquiry: usize,
        devices: Vec<DiscoveredDevice>,
        completions: usize,
    }

    impl DiscoveryListener for Recorder {
        fn pre_inquiry(&mut self) {
            self.pre_inquiry += 1;
        }

        fn device_discovered(&mut self, device: DiscoveredDevice) {
            self.devices.push(device);
        }

        fn inquiry_complete(&mut self) {
            self.completions += 1;
        }
    }

    #[test]
    fn test_start_sends_inquiry() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        assert_eq!(discoverer.state(), InquiryState::Idle);

        discoverer.start(8, true).unwrap();

        assert_eq!(discoverer.state(), InquiryState::Inquiring);
        assert_eq!(
            discoverer.transport().sent,
            vec![vec![0x01, 0x01, 0x04, 0x05, 0x33, 0x8B, 0x9E, 0x08, 0xFF]]
        );
        assert_eq!(discoverer.start(8, true), Err(Error::AlreadyInquiring));
        assert_eq!(discoverer.transport().sent.len(), 1);
    }

    #[test]
    fn test_two_devices_without_names() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[
            (PHONE, 0x01, [0x0C, 0x02, 0x5A], 0x1234),
            (HEADSET, 0x02, [0x04, 0x04, 0x24], 0x0000),
        ]));
        mock.push(inquiry_complete());

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, false).unwrap();
        let events = run(&mut discoverer);

        let found = devices(&events);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].address, wire(PHONE));
        assert_eq!(found[0].class_of_device.unwrap().raw(), 0x5A_020C);
        assert_eq!(found[1].class_of_device.unwrap().raw(), 0x24_0404);
        assert!(found.iter().all(|d| d.name.is_none()));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == DiscoveryEvent::InquiryComplete)
                .count(),
            1
        );
        assert_eq!(events.last(), Some(&DiscoveryEvent::InquiryComplete));
        assert_eq!(discoverer.state(), InquiryState::Idle);
        assert_eq!(discoverer.transport().sent.len(), 1);
    }

    #[test]
    fn test_name_lookup_success() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[(PHONE, 0x01, [0x0C, 0x02, 0x5A], 0x1234)]));
        mock.push(inquiry_complete());
        mock.push(remote_name_complete(0x00, PHONE, b"Pixel"));

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        let sent = &discoverer.transport().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1],
            vec![
                0x01, 0x19, 0x04, 0x0A, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x01, 0x00, 0x34, 0x12
            ]
        );
        assert_eq!(events.len(), 2);
        let DiscoveryEvent::DeviceDiscovered(device) = &events[0] else {
            panic!("expected device");
        };
        assert_eq!(device.address, wire(PHONE));
        assert_eq!(device.name_str(), Some("Pixel"));
        assert_eq!(device.class_of_device.unwrap().raw(), 0x5A_020C);
        assert_eq!(events[1], DiscoveryEvent::InquiryComplete);
    }

    #[test]
    fn test_name_lookup_failure() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[(PHONE, 0x01, [0x0C, 0x02, 0x5A], 0x1234)]));
        mock.push(inquiry_complete());
        mock.push(remote_name_complete(0x04, PHONE, b""));

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        assert_eq!(events, vec![DiscoveryEvent::InquiryComplete]);
        assert_eq!(discoverer.transport().sent.len(), 2);
    }

    #[test]
    fn test_one_name_request_in_flight() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();

        discoverer
            .handle_packet(&inquiry_result(&[
                (PHONE, 0x01, [0, 0, 0], 0),
                (HEADSET, 0x01, [0, 0, 0], 0),
            ]))
            .unwrap();
        discoverer.handle_packet(&inquiry_complete()).unwrap();
        assert_eq!(discoverer.state(), InquiryState::ResolvingNames);
        assert_eq!(discoverer.transport().sent.len(), 2);

        // Repeated completion while a name is outstanding
        assert!(discoverer.handle_packet(&inquiry_complete()).unwrap().is_empty());
        assert_eq!(discoverer.transport().sent.len(), 2);

        let events = discoverer
            .handle_packet(&remote_name_complete(0x00, PHONE, b"Phone"))
            .unwrap();
        assert_eq!(devices(&events)[0].name_str(), Some("Phone"));
        assert_eq!(discoverer.transport().sent.len(), 3);
        assert_eq!(&discoverer.transport().sent[2][4..10], &HEADSET);

        let events = discoverer
            .handle_packet(&remote_name_complete(0x00, HEADSET, b"Headset"))
            .unwrap();
        assert_eq!(devices(&events)[0].name_str(), Some("Headset"));
        assert_eq!(events.last(), Some(&DiscoveryEvent::InquiryComplete));
        assert_eq!(discoverer.state(), InquiryState::Idle);
    }

    #[test]
    fn test_unknown_name_reply_is_ignored() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();
        discoverer
            .handle_packet(&inquiry_result(&[(PHONE, 0x01, [0, 0, 0], 0)]))
            .unwrap();
        discoverer.handle_packet(&inquiry_complete()).unwrap();

        let events = discoverer
            .handle_packet(&remote_name_complete(0x00, HEADSET, b"Stranger"))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(discoverer.state(), InquiryState::ResolvingNames);
    }

    #[test]
    fn test_rssi_results() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result_with_rssi(&[
            (PHONE, [0x0C, 0x02, 0x5A], 0xFF),
            (HEADSET, [0x04, 0x04, 0x24], 0x7F),
        ]));
        mock.push(inquiry_complete());

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, false).unwrap();
        let events = run(&mut discoverer);

        let rssi: Vec<_> = devices(&events).iter().map(|d| d.rssi).collect();
        assert_eq!(rssi, [Some(-1), Some(127)]);
    }

    #[test]
    fn test_extended_result_name_skips_lookup() {
        let mut mock = MockTransport::new();
        mock.push(extended_inquiry_result(
            HEADSET,
            0xC4,
            &[0x06, 0x09, b'S', b'p', b'k', b'r', b'1'],
        ));
        mock.push(inquiry_complete());

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        let found = devices(&events);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name_str(), Some("Spkr1"));
        assert_eq!(found[0].rssi, Some(-60));
        assert!(found[0].eir.is_some());
        assert_eq!(discoverer.transport().sent.len(), 1);
    }

    #[test]
    fn test_duplicate_results_queue_once() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[(PHONE, 0x01, [0, 0, 0], 0)]));
        mock.push(inquiry_result(&[(PHONE, 0x01, [0, 0, 0], 0)]));
        mock.push(inquiry_complete());
        mock.push(remote_name_complete(0x00, PHONE, b"Phone"));

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        assert_eq!(devices(&events).len(), 1);
        assert_eq!(discoverer.transport().sent.len(), 2);
    }

    #[test]
    fn test_rejected_command_aborts() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[(PHONE, 0x01, [0, 0, 0], 0)]));
        mock.push(event(event_codes::COMMAND_STATUS, &[0x0C, 0x01, 0x01, 0x04]));

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        assert_eq!(events, vec![DiscoveryEvent::InquiryComplete]);
        assert_eq!(discoverer.state(), InquiryState::Idle);
        assert_eq!(discoverer.transport().sent.len(), 1);
    }

    #[test]
    fn test_accepted_command_status_is_ignored() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();
        let events = discoverer
            .handle_packet(&event(event_codes::COMMAND_STATUS, &[0x00, 0x01, 0x01, 0x04]))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(discoverer.state(), InquiryState::Inquiring);
    }

    #[test]
    fn test_cancel_while_inquiring() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();
        discoverer
            .handle_packet(&inquiry_result(&[(PHONE, 0x01, [0, 0, 0], 0)]))
            .unwrap();

        assert!(discoverer.cancel().unwrap().is_empty());
        assert_eq!(discoverer.transport().sent[1], vec![0x01, 0x02, 0x04, 0x00]);

        let events = discoverer
            .handle_packet(&event(event_codes::COMMAND_COMPLETE, &[0x01, 0x02, 0x04, 0x00]))
            .unwrap();
        assert_eq!(events, vec![DiscoveryEvent::InquiryComplete]);
        assert_eq!(discoverer.transport().sent.len(), 2);
        assert_eq!(discoverer.state(), InquiryState::Idle);
    }

    #[test]
    fn test_cancel_while_resolving_waits_for_outstanding_name() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();
        discoverer
            .handle_packet(&inquiry_result(&[
                (PHONE, 0x01, [0, 0, 0], 0),
                (HEADSET, 0x01, [0, 0, 0], 0),
            ]))
            .unwrap();
        discoverer.handle_packet(&inquiry_complete()).unwrap();

        assert!(discoverer.cancel().unwrap().is_empty());
        let events = discoverer
            .handle_packet(&remote_name_complete(0x00, PHONE, b"Phone"))
            .unwrap();

        assert_eq!(devices(&events).len(), 1);
        assert_eq!(events.last(), Some(&DiscoveryEvent::InquiryComplete));
        assert_eq!(discoverer.transport().sent.len(), 2);
    }

    #[test]
    fn test_results_after_cancel_are_not_queued() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, true).unwrap();
        discoverer.cancel().unwrap();

        let events = discoverer
            .handle_packet(&inquiry_result(&[(PHONE, 0x01, [0x0C, 0x02, 0x5A], 0x1234)]))
            .unwrap();
        let found = devices(&events);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address, wire(PHONE));
        assert!(found[0].name.is_none());

        let events = discoverer
            .handle_packet(&event(event_codes::COMMAND_COMPLETE, &[0x01, 0x02, 0x04, 0x00]))
            .unwrap();
        assert_eq!(events, vec![DiscoveryEvent::InquiryComplete]);
        // Inquiry and Inquiry Cancel only, no name request
        assert_eq!(discoverer.transport().sent.len(), 2);
    }

    #[test]
    fn test_resolved_extended_result_keeps_eir() {
        let mut mock = MockTransport::new();
        mock.push(extended_inquiry_result(
            HEADSET,
            0xC4,
            &[0x02, 0x0A, 0xF4, 0x03, 0x03, 0x0B, 0x11],
        ));
        mock.push(inquiry_complete());
        mock.push(remote_name_complete(0x00, HEADSET, b"Speaker"));

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        let found = devices(&events);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name_str(), Some("Speaker"));
        let eir = found[0].eir.as_ref().unwrap();
        assert_eq!(eir.tx_power(), Some(-12));
        assert_eq!(
            eir.service_uuids().as_slice(),
            &[crate::BluetoothUuid::Uuid16(0x110B)]
        );
        assert_eq!(discoverer.transport().sent.len(), 2);
    }

    #[test]
    fn test_lookup_name() {
        let mut mock = MockTransport::new();
        mock.push(event(event_codes::COMMAND_STATUS, &[0x00, 0x01, 0x19, 0x04]));
        mock.push(remote_name_complete(0x00, HEADSET, b"Other"));
        mock.push(remote_name_complete(0x00, PHONE, b"Pixel"));

        let name = lookup_name(&mut mock, wire(PHONE)).unwrap();

        assert_eq!(name.as_ref().and_then(DeviceName::as_str), Some("Pixel"));
        assert_eq!(
            mock.sent,
            vec![vec![
                0x01, 0x19, 0x04, 0x0A, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x02, 0x00, 0x00, 0x00
            ]]
        );
        assert_eq!(mock.reads, 3);
    }

    #[test]
    fn test_lookup_name_failures() {
        let mut mock = MockTransport::new();
        mock.push(remote_name_complete(0x04, PHONE, b""));
        assert_eq!(lookup_name(&mut mock, wire(PHONE)), Ok(None));

        let mut mock = MockTransport::new();
        mock.push(event(event_codes::COMMAND_STATUS, &[0x0C, 0x01, 0x19, 0x04]));
        assert_eq!(lookup_name(&mut mock, wire(PHONE)), Ok(None));

        let mut mock = MockTransport::new();
        assert_eq!(
            lookup_name(&mut mock, wire(PHONE)),
            Err(Error::Transport(TransportError::Closed))
        );
    }

    #[test]
    fn test_other_command_complete_does_not_end_inquiry() {
        let mut discoverer = DeviceDiscoverer::new(MockTransport::new());
        discoverer.start(8, false).unwrap();
        let events = discoverer
            .handle_packet(&event(event_codes::COMMAND_COMPLETE, &[0x01, 0x03, 0x0C, 0x00]))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(discoverer.state(), InquiryState::Inquiring);
    }

    #[test]
    fn test_malformed_packets_are_skipped() {
        let mut mock = MockTransport::new();
        mock.push(vec![0x02, 0x00, 0x00]);
        mock.push(vec![0x04, 0x02, 0x0F, 0x01]);
        mock.push(event(0x3E, &[0x01]));
        mock.push(inquiry_complete());

        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();
        let events = run(&mut discoverer);

        assert_eq!(events, vec![DiscoveryEvent::InquiryComplete]);
        assert_eq!(discoverer.transport().reads, 4);
    }

    #[test]
    fn test_idle_discoverer_does_not_read() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_complete());
        let mut discoverer = DeviceDiscoverer::new(mock);

        assert!(discoverer.process_event().unwrap().is_empty());
        assert_eq!(discoverer.transport().reads, 0);
        assert_eq!(discoverer.poll_handle(), None);

        discoverer.start(8, true).unwrap();
        assert_eq!(discoverer.poll_handle(), Some(7));
    }

    #[test]
    fn test_transport_errors_propagate() {
        let mut mock = MockTransport::new();
        mock.push_error(TransportError::Receive);
        let mut discoverer = DeviceDiscoverer::new(mock);
        discoverer.start(8, true).unwrap();

        assert_eq!(
            discoverer.process_event(),
            Err(Error::Transport(TransportError::Receive))
        );
        assert_eq!(discoverer.state(), InquiryState::Inquiring);

        let mut mock = MockTransport::new();
        mock.fail_send = true;
        let mut discoverer = DeviceDiscoverer::new(mock);
        assert_eq!(
            discoverer.start(8, true),
            Err(Error::Transport(TransportError::Send))
        );
        assert_eq!(discoverer.state(), InquiryState::Idle);
    }

    #[test]
    fn test_process_inquiry_dispatches_to_listener() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result(&[(PHONE, 0x01, [0x0C, 0x02, 0x5A], 0x1234)]));
        mock.push(inquiry_complete());
        mock.push(remote_name_complete(0x00, PHONE, b"Pixel"));

        let mut discoverer = DeviceDiscoverer::new(mock);
        let mut recorder = Recorder::default();
        discoverer.find_devices(&mut recorder, 8, true).unwrap();
        discoverer.process_inquiry(&mut recorder).unwrap();

        assert_eq!(recorder.pre_inquiry, 1);
        assert_eq!(recorder.completions, 1);
        assert_eq!(recorder.devices.len(), 1);
        assert_eq!(recorder.devices[0].name_str(), Some("Pixel"));
    }

    #[test]
    fn test_discover_devices_without_class() {
        let mut mock = MockTransport::new();
        mock.push(inquiry_result_with_rssi(&[(PHONE, [0x0C, 0x02, 0x5A], 0xC4)]));
        mock.push(inquiry_complete());

        let options = InquiryOptions::default()
            .with_lookup_names(false)
            .with_lookup_class(false)
            .with_duration(4);
        let found = discover_devices(&mut mock, &options).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address, wire(PHONE));
        assert_eq!(found[0].class_of_device, None);
        assert_eq!(found[0].rssi, Some(-60));
        assert_eq!(mock.sent[0][7], 4);
    }

    #[test]
    fn test_options_builders() {
        let options = InquiryOptions::default()
            .with_lap(crate::constants::LIAC)
            .with_max_responses(10)
            .with_device_id(0);
        assert_eq!(options.lap, 0x9E_8B00);
        assert_eq!(options.max_responses, 10);
        assert_eq!(options.device_id, 0);
        assert_eq!(options.duration, 8);
        assert!(options.lookup_names && options.lookup_class);
    }
}
