//! Error taxonomy for one transmission session.
//!
//! Every failure carries enough context to diagnose without re-running with
//! added instrumentation: the offending input character and its position,
//! the register a configuration write was aimed at, or the byte offset of
//! the data chunk that failed. Nothing is swallowed or retried internally;
//! retry policy belongs to the caller.

use crate::driver::TxState;
use thiserror::Error;

/// Everything that can go wrong between parsing the bit string and the last
/// data chunk leaving the host.
#[derive(Debug, Error)]
pub enum TxError {
    /// The logical bit string contains a character other than `0` or `1`.
    ///
    /// Detected before any device interaction; resupplying valid input is
    /// always sufficient to recover.
    #[error("invalid character `{found}` at position {position} (expected 0 or 1)")]
    InvalidInput {
        /// The offending character.
        found: char,
        /// Zero-based character position in the input string.
        position: usize,
    },

    /// No adapter with the expected vendor/product id pair is on the bus.
    #[error("no adapter {vendor_id:04x}:{product_id:04x} found")]
    DeviceNotFound {
        /// Vendor id the bus was scanned for.
        vendor_id: u16,
        /// Product id the bus was scanned for.
        product_id: u16,
    },

    /// Acquiring the adapter failed after it was found (kernel-driver
    /// detach or interface claim).
    #[error("usb: {0}")]
    Usb(#[from] rusb::Error),

    /// A clock or mode configuration write failed.
    ///
    /// Fatal for the session; no data is ever transmitted against an
    /// unconfirmed clock.
    #[error("configuration write to register {register:#06x} failed: {source}")]
    DeviceConfig {
        /// Register the write was addressed to.
        register: u16,
        /// The underlying transport fault.
        source: rusb::Error,
    },

    /// No prescale/divisor pair reproduces the requested symbol rate within
    /// tolerance.
    #[error(
        "{target_rate} Sym/s is not representable from a {reference_hz} Hz reference \
         with the adapter's divisors"
    )]
    UnrepresentableRate {
        /// The requested output rate.
        target_rate: u32,
        /// The reference frequency the divisors work from.
        reference_hz: u32,
    },

    /// A data chunk write failed mid-stream.
    ///
    /// Chunks before the offset were already issued and are not retracted;
    /// the receiver may have seen a truncated transmission.
    #[error("transfer failed at byte offset {offset}: {source}")]
    Transfer {
        /// Byte offset of the failed chunk within the packed buffer.
        offset: usize,
        /// The underlying transport fault.
        source: rusb::Error,
    },

    /// A session operation was invoked from the wrong state, for example
    /// transmitting before the clock was configured or reusing a finished
    /// session.
    #[error("session is {state:?}, expected {expected:?}")]
    Session {
        /// The state the session was actually in.
        state: TxState,
        /// The state the operation requires.
        expected: TxState,
    },
}
