//! HCI transport
//!
//! The inquiry engine never touches a socket or UART itself. Whatever carries
//! HCI packets to and from the controller implements [`Transport`].

use crate::error::TransportError;

/// Pollable OS handle, such as a file descriptor
pub type RawHandle = i32;

/// Byte-level HCI packet channel
///
/// Packets include their indicator byte (0x01 command, 0x04 event).
pub trait Transport {
    /// Send one complete packet
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the packet could not be written
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError>;

    /// Block until one packet arrives and copy it into `buffer`
    ///
    /// Returns the packet length.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if reading failed or the channel closed
    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError>;

    /// Handle an event loop can wait on before calling [`Transport::recv`]
    fn poll_handle(&self) -> Option<RawHandle> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        (**self).send(packet)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        (**self).recv(buffer)
    }

    fn poll_handle(&self) -> Option<RawHandle> {
        (**self).poll_handle()
    }
}
