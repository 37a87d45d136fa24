//! Socket capability
//!
//! The transfer never names a concrete socket type. Name lookup and streams are
//! reached through [`Network`], which lets the same state machine run over
//! `std::net` ([`tcp::StdNetwork`]) or a scripted in-memory network in tests.
//!
//! All operations are non-blocking. "Not yet" is reported as `None`,
//! `Ok(false)` or an [`io::ErrorKind::WouldBlock`] error depending on the call.

use std::io;
use std::net::{IpAddr, SocketAddr};

pub mod tcp;

/// Opens lookups and streams.
pub trait Network {
    type Lookup: Lookup;
    type Stream: Stream;

    /// Begin resolving `host`. Must not block.
    fn lookup(&mut self, host: &str) -> Self::Lookup;

    /// Begin connecting to `addr`. Must not block.
    ///
    /// An `Err` here means the stream could not even be created. Connection
    /// failures after that are reported by [`Stream::poll_connected`].
    fn connect(&mut self, addr: SocketAddr) -> io::Result<Self::Stream>;
}

/// An outstanding name lookup.
///
/// Dropping the lookup abandons it without blocking.
pub trait Lookup {
    /// `None` while the lookup is pending.
    fn poll(&mut self) -> Option<io::Result<IpAddr>>;
}

/// A non-blocking stream socket.
pub trait Stream {
    /// `Ok(false)` while the connect is in progress.
    fn poll_connected(&mut self) -> io::Result<bool>;

    /// Send as much of `buf` as the socket accepts right now.
    ///
    /// A full send buffer is reported as `WouldBlock`.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Receive into `buf`. `Ok(0)` means the peer closed the connection.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Tell whether the error only means "try again later".
pub(crate) fn is_would_block(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}
