//! # asktx
//!
//! Drives a general-purpose USB serial-clock adapter as a fixed-rate
//! Amplitude Shift Keying (ASK/OOK) transmitter, reproducing the exact
//! 433 MHz bitstream a proprietary remote control would have sent to its
//! receiver module.
//!
//! The adapter's output stage drains an internal byte buffer at a clock
//! derived from its 12 MHz crystal, so on-air symbol timing is set entirely
//! by the device. The host side is a pipeline of three steps:
//!
//! - [`encoding`]: expand each logical bit into a 3-unit line symbol
//!   (`0` becomes `001`, `1` becomes `110`) and pack the unit stream into
//!   bytes, most-significant unit first.
//! - [`clock`]: pick a prescale/divisor pair that divides the crystal down
//!   to the target symbol rate (2500 Sym/s by default) and write it to the
//!   adapter's configuration registers.
//! - [`driver`]: stream the packed buffer to the adapter in order, split
//!   into transfers no larger than the device's single-transfer limit.
//!
//! Transmission is open loop. The receiver never acknowledges anything and
//! a session either completes or fails; there is no retry layer here.
//!
//! ## Usage
//!
//! ```no_run
//! use asktx::clock;
//! use asktx::consts::{CRYSTAL_HZ, DEFAULT_CHUNK_LEN, DEFAULT_SYMBOL_RATE};
//! use asktx::driver::TxSession;
//! use asktx::encoding;
//! use asktx::port::UsbPort;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let frame = encoding::encode("100101110")?;
//!     let pair = clock::divisors_for(
//!         DEFAULT_SYMBOL_RATE,
//!         CRYSTAL_HZ,
//!         clock::prescale_candidates(),
//!         1..=u8::MAX,
//!     )?;
//!     let mut session = TxSession::new(UsbPort::open()?, DEFAULT_CHUNK_LEN);
//!     session.configure(&pair)?;
//!     session.transmit(&frame)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The line code and symbol rate are treated as known constants of the
//!   receiver, derived once by spectrum analysis of the original remote.
//! - One session per device handle at a time; the handle is an exclusively
//!   owned resource, released on every exit path.
//! - All device calls are blocking. Configuration must complete before any
//!   data transfer starts.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

pub mod clock;
pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod port;
