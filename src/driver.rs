//! Session driver: ordered, chunked delivery of one packed buffer.
//!
//! This module provides [`TxSession`], which owns the device port for the
//! duration of one transmission and walks it through configuration and
//! transfer. The adapter's internal clock drains its FIFO at the configured
//! symbol rate, so on-air timing depends only on bytes arriving in order;
//! the session's whole job is to preserve that order while never exceeding
//! the device's single-transfer limit.
//!
//! ## Design Notes
//!
//! A session is single use. Once it reaches [`TxState::Done`] or
//! [`TxState::Failed`] it stays there; replaying a command means building a
//! new session (and a new frame) from scratch. Already-issued chunks are
//! never retracted on failure, because the transmission is open loop and
//! the receiver may have heard them; the error's byte offset says exactly
//! how far the stream got.

use crate::clock::{self, DivisorPair};
use crate::error::TxError;
use crate::port::ControlPort;
use log::trace;
use std::num::NonZeroUsize;

/// Lifecycle of one transmission session.
///
/// `Idle -> Configuring -> Transmitting -> Done`, with `Failed` reachable
/// from `Configuring` and `Transmitting`. No transition leads back to
/// `Idle`.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum TxState {
    /// Fresh session; the clock has not been touched.
    #[default]
    Idle,
    /// The clock configuration has been written and confirmed; data may
    /// now be streamed.
    Configuring,
    /// Data chunks are being issued.
    Transmitting,
    /// Every byte of the buffer was issued in order.
    Done,
    /// A configuration or transfer fault ended the session.
    Failed,
}

/// One open-loop transmission session against an exclusively owned port.
#[derive(Debug)]
pub struct TxSession<P: ControlPort> {
    port: P,
    state: TxState,
    chunk_len: NonZeroUsize,
}

impl<P: ControlPort> TxSession<P> {
    /// Creates an idle session around `port`.
    ///
    /// `chunk_len` caps the payload of a single data transfer; see
    /// [`DEFAULT_CHUNK_LEN`](crate::consts::DEFAULT_CHUNK_LEN) for the
    /// reference hardware's limit.
    pub fn new(port: P, chunk_len: NonZeroUsize) -> Self {
        Self { port, state: TxState::Idle, chunk_len }
    }

    /// The session's current lifecycle state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Writes the clock configuration for this session.
    ///
    /// Must succeed before [`transmit`](TxSession::transmit) is called.
    /// Calling it again before any data has been sent is allowed and
    /// rewrites the full configuration; a session that has transmitted or
    /// failed cannot be reconfigured.
    ///
    /// # Errors
    /// [`TxError::DeviceConfig`] if a configuration write fails (the
    /// session becomes [`TxState::Failed`]), [`TxError::Session`] when
    /// invoked from a spent session.
    pub fn configure(&mut self, pair: &DivisorPair) -> Result<(), TxError> {
        match self.state {
            TxState::Idle | TxState::Configuring => {}
            state => {
                return Err(TxError::Session { state, expected: TxState::Idle });
            }
        }
        self.state = TxState::Configuring;
        if let Err(err) = clock::apply(&mut self.port, pair) {
            self.state = TxState::Failed;
            return Err(err);
        }
        Ok(())
    }

    /// Streams `frame` to the device in order, in bounded chunks.
    ///
    /// Chunks are issued strictly sequentially as blocking writes; the
    /// final chunk may be shorter. An empty frame issues nothing and
    /// succeeds. On success every byte has been handed to the device,
    /// split only at chunk boundaries, none duplicated or reordered.
    ///
    /// # Errors
    /// [`TxError::Transfer`] with the byte offset of the failing chunk;
    /// earlier chunks stay issued. [`TxError::Session`] when the clock was
    /// never configured or the session is spent. No automatic retry either
    /// way.
    pub fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError> {
        if self.state != TxState::Configuring {
            return Err(TxError::Session { state: self.state, expected: TxState::Configuring });
        }
        self.state = TxState::Transmitting;
        for (index, chunk) in frame.chunks(self.chunk_len.get()).enumerate() {
            let offset = index * self.chunk_len.get();
            if let Err(source) = self.port.write_chunk(chunk) {
                self.state = TxState::Failed;
                return Err(TxError::Transfer { offset, source });
            }
            trace!("issued {} bytes at offset {offset}", chunk.len());
        }
        self.state = TxState::Done;
        Ok(())
    }

    /// Releases the session, handing the port back to the caller.
    pub fn into_port(self) -> P {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockPort;

    fn pair() -> DivisorPair {
        DivisorPair { prescale: 32, divisor: 150 }
    }

    fn chunk_len(len: usize) -> NonZeroUsize {
        NonZeroUsize::new(len).unwrap()
    }

    #[test]
    fn splits_at_chunk_boundaries_in_order() {
        let frame: Vec<u8> = (0..100).collect();
        let mut session = TxSession::new(MockPort::default(), chunk_len(32));
        session.configure(&pair()).unwrap();
        session.transmit(&frame).unwrap();

        let port = session.into_port();
        let sizes: Vec<usize> = port.chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![32, 32, 32, 4]);
        let rejoined: Vec<u8> = port.chunks.concat();
        assert_eq!(rejoined, frame);
    }

    #[test]
    fn empty_frame_issues_no_chunks() {
        let mut session = TxSession::new(MockPort::default(), chunk_len(32));
        session.configure(&pair()).unwrap();
        session.transmit(&[]).unwrap();
        assert_eq!(session.state(), TxState::Done);
        assert!(session.into_port().chunks.is_empty());
    }

    #[test]
    fn reaches_done_through_the_expected_states() {
        let mut session = TxSession::new(MockPort::default(), chunk_len(8));
        assert_eq!(session.state(), TxState::Idle);
        session.configure(&pair()).unwrap();
        assert_eq!(session.state(), TxState::Configuring);
        session.transmit(&[0xc7, 0x10]).unwrap();
        assert_eq!(session.state(), TxState::Done);
    }

    #[test]
    fn transfer_fault_names_the_byte_offset() {
        let port = MockPort { fail_chunk_at: Some(2), ..MockPort::default() };
        let frame: Vec<u8> = (0..100).collect();
        let mut session = TxSession::new(port, chunk_len(32));
        session.configure(&pair()).unwrap();

        match session.transmit(&frame) {
            Err(TxError::Transfer { offset, .. }) => assert_eq!(offset, 64),
            other => panic!("expected Transfer, got {other:?}"),
        }
        assert_eq!(session.state(), TxState::Failed);
        // The first two chunks were already on the wire and stay issued.
        assert_eq!(session.into_port().chunks.len(), 2);
    }

    #[test]
    fn config_fault_fails_the_session_before_any_data() {
        let port = MockPort { fail_config_at: Some(0), ..MockPort::default() };
        let mut session = TxSession::new(port, chunk_len(32));
        assert!(matches!(session.configure(&pair()), Err(TxError::DeviceConfig { .. })));
        assert_eq!(session.state(), TxState::Failed);

        // The session is spent; transmitting is refused outright.
        match session.transmit(&[1, 2, 3]) {
            Err(TxError::Session { state, expected }) => {
                assert_eq!(state, TxState::Failed);
                assert_eq!(expected, TxState::Configuring);
            }
            other => panic!("expected Session, got {other:?}"),
        }
        assert!(session.into_port().chunks.is_empty());
    }

    #[test]
    fn transmit_requires_a_configured_clock() {
        let mut session = TxSession::new(MockPort::default(), chunk_len(32));
        match session.transmit(&[0xff]) {
            Err(TxError::Session { state, expected }) => {
                assert_eq!(state, TxState::Idle);
                assert_eq!(expected, TxState::Configuring);
            }
            other => panic!("expected Session, got {other:?}"),
        }
        assert!(session.into_port().chunks.is_empty());
    }

    #[test]
    fn sessions_are_single_use() {
        let mut session = TxSession::new(MockPort::default(), chunk_len(32));
        session.configure(&pair()).unwrap();
        session.transmit(&[1, 2, 3]).unwrap();

        assert!(matches!(
            session.configure(&pair()),
            Err(TxError::Session { state: TxState::Done, .. })
        ));
        assert!(matches!(
            session.transmit(&[4, 5]),
            Err(TxError::Session { state: TxState::Done, .. })
        ));
    }

    #[test]
    fn reconfiguring_before_data_overwrites_everything() {
        let mut session = TxSession::new(MockPort::default(), chunk_len(32));
        session.configure(&pair()).unwrap();
        session.configure(&DivisorPair { prescale: 64, divisor: 75 }).unwrap();

        let port = session.into_port();
        // Two full three-write sequences; the second stands alone.
        assert_eq!(port.configs.len(), 6);
        assert_eq!(port.configs[4].1, 6); // exponent of 64
        assert_eq!(port.configs[5].1, 75);
    }
}
