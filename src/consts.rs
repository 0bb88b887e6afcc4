//! Constants describing the adapter and the transmission parameters.
//!
//! Everything the tool knows about the reference hardware lives here: how
//! the adapter is identified on the bus, which vendor requests and registers
//! drive its clocked output mode, the crystal the clock tree divides from,
//! and the transfer limits of its internal buffer.
//!
//! The register and request numbers were captured from the adapter's stock
//! serial driver; the symbol rate was measured once from the original remote
//! with a spectrum analyzer.

use std::num::NonZeroUsize;
use std::time::Duration;

/// USB vendor id of the adapter.
pub const VENDOR_ID: u16 = 0x1a86;

/// USB product id of the adapter.
pub const PRODUCT_ID: u16 = 0x5523;

/// The interface claimed for the duration of a session.
pub const ADAPTER_INTERFACE: u8 = 0;

/// Vendor request writing one 16-bit value to a configuration register.
///
/// Carried as a control OUT transfer with an empty payload: `wValue` selects
/// the register, `wIndex` holds the value.
pub const REQ_WRITE_REG: u8 = 0x9a;

/// Vendor request appending a payload to the adapter's output FIFO.
///
/// The FIFO drains at the configured clock rate, most-significant bit of
/// each byte first.
pub const REQ_WRITE_FIFO: u8 = 0xa6;

/// Register selecting the output mode of the serial stage.
pub const REG_MODE: u16 = 0x2518;

/// Mode value enabling free-running clocked output (no start/stop framing).
pub const MODE_CLOCKED_TX: u16 = 0x0001;

/// Register holding the clock prescale exponent (the N stage, as log2 N).
pub const REG_CLOCK_PRESCALE: u16 = 0x1312;

/// Register holding the clock divisor (the M stage, stored directly).
pub const REG_CLOCK_DIVISOR: u16 = 0x1313;

/// Frequency of the adapter's reference crystal in Hz.
pub const CRYSTAL_HZ: u32 = 12_000_000;

/// Default output rate in line-code units per second.
///
/// 12 MHz / 32 / 150 reproduces this exactly, so the default configuration
/// has zero rate error.
pub const DEFAULT_SYMBOL_RATE: u32 = 2_500;

/// Largest prescale exponent the prescale register accepts (N up to 128).
pub const MAX_PRESCALE_EXP: u32 = 7;

/// Largest payload the adapter accepts in a single data transfer.
///
/// Writing beyond this overruns the internal FIFO, so the transfer driver
/// never issues a longer chunk. Empirically tuned, not a protocol
/// guarantee; the CLI exposes it as a flag.
pub const DEFAULT_CHUNK_LEN: NonZeroUsize = NonZeroUsize::new(32).unwrap();

/// Timeout applied to every control transfer.
pub const USB_TIMEOUT: Duration = Duration::from_millis(500);
