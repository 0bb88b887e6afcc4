//! The device boundary: vendor control requests over USB.
//!
//! The adapter is driven entirely through two vendor requests: register
//! writes for mode and clock configuration, and FIFO writes carrying the
//! packed symbol buffer. [`ControlPort`] is the seam between the session
//! logic and the bus, so everything above it is tested against a mock and
//! only [`UsbPort`] needs real hardware.

use crate::consts::{
    ADAPTER_INTERFACE, PRODUCT_ID, REQ_WRITE_FIFO, REQ_WRITE_REG, USB_TIMEOUT, VENDOR_ID,
};
use crate::error::TxError;
use rusb::{DeviceHandle, Direction, GlobalContext, Recipient, RequestType};

/// Host-to-device control channel of the adapter.
///
/// Both operations are blocking; they return once the transfer completes or
/// the underlying call gives up. Implementations carry no policy: ordering,
/// chunk sizing and retry decisions all live with the caller.
pub trait ControlPort {
    /// Writes one 16-bit value to a configuration register.
    fn write_config(&mut self, register: u16, value: u16) -> rusb::Result<()>;

    /// Appends one chunk to the adapter's output FIFO.
    ///
    /// A short write is a fault; implementations must report it as an error
    /// rather than returning partial success.
    fn write_chunk(&mut self, chunk: &[u8]) -> rusb::Result<()>;
}

/// The real adapter, located by its fixed vendor/product id pair.
///
/// The handle is an exclusively owned session resource: the interface is
/// claimed in [`open`](UsbPort::open) and released when the port drops,
/// whichever way the session ends.
#[derive(Debug)]
pub struct UsbPort {
    handle: DeviceHandle<GlobalContext>,
}

impl UsbPort {
    /// Opens the adapter, detaching any kernel serial driver bound to it.
    ///
    /// # Errors
    /// [`TxError::DeviceNotFound`] when no device with the expected id pair
    /// is on the bus; [`TxError::Usb`] when the device exists but cannot be
    /// acquired.
    pub fn open() -> Result<Self, TxError> {
        let handle = rusb::open_device_with_vid_pid(VENDOR_ID, PRODUCT_ID).ok_or(
            TxError::DeviceNotFound { vendor_id: VENDOR_ID, product_id: PRODUCT_ID },
        )?;
        match handle.set_auto_detach_kernel_driver(true) {
            // Platforms without detach support never bind a serial driver
            // to this adapter in the first place.
            Ok(()) | Err(rusb::Error::NotSupported) => {}
            Err(source) => return Err(TxError::Usb(source)),
        }
        handle.claim_interface(ADAPTER_INTERFACE)?;
        Ok(Self { handle })
    }
}

impl ControlPort for UsbPort {
    fn write_config(&mut self, register: u16, value: u16) -> rusb::Result<()> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        let _ = self
            .handle
            .write_control(request_type, REQ_WRITE_REG, register, value, &[], USB_TIMEOUT)?;
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> rusb::Result<()> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        let written = self
            .handle
            .write_control(request_type, REQ_WRITE_FIFO, 0, 0, chunk, USB_TIMEOUT)?;
        if written != chunk.len() {
            return Err(rusb::Error::Io);
        }
        Ok(())
    }
}

impl Drop for UsbPort {
    fn drop(&mut self) {
        // Best effort; closing the handle severs the claim anyway.
        let _ = self.handle.release_interface(ADAPTER_INTERFACE);
    }
}

/// Transaction-recording stand-in for the adapter, for tests.
///
/// Records every register and FIFO write in order and can inject a fault at
/// the nth call of either kind.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MockPort {
    pub(crate) configs: Vec<(u16, u16)>,
    pub(crate) chunks: Vec<Vec<u8>>,
    pub(crate) fail_config_at: Option<usize>,
    pub(crate) fail_chunk_at: Option<usize>,
}

#[cfg(test)]
impl ControlPort for MockPort {
    fn write_config(&mut self, register: u16, value: u16) -> rusb::Result<()> {
        if self.fail_config_at == Some(self.configs.len()) {
            return Err(rusb::Error::Pipe);
        }
        self.configs.push((register, value));
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> rusb::Result<()> {
        if self.fail_chunk_at == Some(self.chunks.len()) {
            return Err(rusb::Error::Pipe);
        }
        self.chunks.push(chunk.to_vec());
        Ok(())
    }
}
