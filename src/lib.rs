//! Tick driven HTTP/1.1 transfers.
//!
//! A [`Transfer`] performs one GET or POST without ever blocking the caller.
//! Each call to [`Transfer::tick`] does a bounded amount of work: poll a name
//! lookup, poll a connect, send a chunk, read what has arrived. The caller
//! keeps calling `tick` (typically once per frame) until the transfer is
//! [`State::Closed`] or [`State::Error`].
//!
//! The response body goes to any [`std::io::Write`] sink. Sockets are reached
//! through the [`net::Network`] capability, with [`net::tcp::StdNetwork`] as the
//! `std::net` implementation.
//!
//! ```no_run
//! use std::time::Duration;
//! use tickhttp::net::tcp::StdNetwork;
//! use tickhttp::{RequestMethod, State, Transfer, TransferConfig};
//!
//! let config = TransferConfig::download(Duration::from_secs(30), 5, RequestMethod::Get);
//! let mut transfer = Transfer::new(StdNetwork::new(), config);
//!
//! transfer.start("example.test/patch.bin", Some(Vec::<u8>::new()), None);
//!
//! while !transfer.is_finished() {
//!     transfer.tick(Duration::from_millis(16));
//!     std::thread::sleep(Duration::from_millis(16));
//! }
//!
//! if transfer.state() == State::Closed {
//!     let body = transfer.take_sink().unwrap();
//!     println!("got {} bytes", body.len());
//! }
//! ```

#[macro_use]
extern crate log;

use std::time::Duration;

// Re-export the basis for this library.
pub use http;

mod error;
pub use error::Error;

pub mod url;
pub use url::{Url, UrlError};

pub mod net;

mod parser;
mod request;

mod transfer;
pub use transfer::{RequestMethod, State, Transfer, TransferConfig};

pub mod drive;

/// Max number of headers to parse from a response head.
pub const MAX_RESPONSE_HEADERS: usize = 128;

/// Max size of a response head before giving up on it.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Default max payload bytes sent per tick.
pub const DEFAULT_POST_CHUNK_SIZE: usize = 4096;

/// Bytes read per `recv` when receiving the body.
pub const RECV_BUFFER_SIZE: usize = 4096;

/// How long a connect may stay in progress.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PORT: u16 = 80;
