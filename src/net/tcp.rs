//! [`Network`] on top of `std::net` and `socket2`.
//!
//! Connects are real non-blocking connects: the socket is created
//! non-blocking, `connect` reports "in progress" and completion is polled
//! through `SO_ERROR` and the peer address.
//!
//! `std` has no asynchronous resolver, so lookups run on a short lived helper
//! thread that reports back over a channel. Dropping a [`TcpLookup`] detaches
//! the helper; whatever it produces afterwards is discarded.

use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::{is_would_block, Lookup, Network, Stream};

/// Lookups and TCP streams via `std::net` and `socket2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdNetwork;

impl StdNetwork {
    pub fn new() -> Self {
        StdNetwork
    }
}

impl Network for StdNetwork {
    type Lookup = TcpLookup;
    type Stream = TcpStream;

    fn lookup(&mut self, host: &str) -> TcpLookup {
        let host = host.to_string();

        let rx = spawn_helper("tickhttp-lookup", move || {
            let mut addrs = (host.as_str(), 0).to_socket_addrs()?;
            addrs
                .next()
                .map(|a| a.ip())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses found"))
        });

        TcpLookup { rx }
    }

    fn connect(&mut self, addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;

        match socket.connect(&SockAddr::from(addr)) {
            Ok(()) => {}
            Err(e) if connect_in_progress(&e) => {}
            Err(e) => return Err(e),
        }

        trace!("Connect to {} initiated", addr);

        Ok(TcpStream {
            socket,
            connected: false,
        })
    }
}

fn spawn_helper<T, F>(name: &str, f: F) -> Receiver<io::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new().name(name.into()).spawn(move || {
        // The receiver is gone if the transfer was dropped meanwhile.
        let _ = tx.send(f());
    });

    // On failure the closure, and with it the sender, is dropped. The
    // receiver then reports disconnected on the first poll.
    if let Err(e) = spawned {
        warn!("Failed to spawn {} thread: {}", name, e);
    }

    rx
}

fn connect_in_progress(e: &io::Error) -> bool {
    is_would_block(e) || is_errno(e, IN_PROGRESS)
}

/// A full send buffer only means "try again later".
fn no_buffer_space_blocks(e: io::Error) -> io::Error {
    if is_errno(&e, NO_BUFFER_SPACE) {
        io::ErrorKind::WouldBlock.into()
    } else {
        e
    }
}

#[cfg(unix)]
const IN_PROGRESS: Option<i32> = Some(libc::EINPROGRESS);
#[cfg(unix)]
const NO_BUFFER_SPACE: Option<i32> = Some(libc::ENOBUFS);

// socket2 reports WSAEWOULDBLOCK as WouldBlock, and WSAENOBUFS has no errno.
#[cfg(not(unix))]
const IN_PROGRESS: Option<i32> = None;
#[cfg(not(unix))]
const NO_BUFFER_SPACE: Option<i32> = None;

fn is_errno(e: &io::Error, code: Option<i32>) -> bool {
    code.is_some() && e.raw_os_error() == code
}

fn helper_vanished() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "helper thread ended without a result")
}

/// Name lookup running on a helper thread.
#[derive(Debug)]
pub struct TcpLookup {
    rx: Receiver<io::Result<IpAddr>>,
}

impl Lookup for TcpLookup {
    fn poll(&mut self) -> Option<io::Result<IpAddr>> {
        match self.rx.try_recv() {
            Ok(v) => Some(v),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(helper_vanished())),
        }
    }
}

/// Non-blocking TCP stream.
#[derive(Debug)]
pub struct TcpStream {
    socket: Socket,
    connected: bool,
}

impl TcpStream {
    fn connected(&mut self) -> io::Result<&mut Socket> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
        }
        Ok(&mut self.socket)
    }
}

impl Stream for TcpStream {
    fn poll_connected(&mut self) -> io::Result<bool> {
        if self.connected {
            return Ok(true);
        }

        if let Some(e) = self.socket.take_error()? {
            return Err(e);
        }

        match self.socket.peer_addr() {
            Ok(peer) => {
                self.socket.set_nodelay(true)?;
                debug!("Connected to {:?}", peer.as_socket());
                self.connected = true;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.connected()?.write(buf).map_err(no_buffer_space_blocks)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.connected()?.read(buf)
    }
}
