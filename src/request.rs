use std::io::{self, Write};

use http::{Method, Version};

use crate::net::{is_would_block, Stream};
use crate::url::Url;
use crate::Error;

/// What goes into a request prelude besides the url.
pub(crate) struct PreludeParams<'a> {
    pub method: &'a Method,
    pub extra_query: &'a str,
    pub user_agent: &'a str,
    /// Set for requests carrying a body.
    pub content_length: Option<usize>,
}

/// Format the request line and headers.
///
/// ```text
/// GET /escaped/path?query HTTP/1.1\r\n
/// Host: host.test\r\n
/// User-Agent: app-1.0\r\n
/// Content-Type: application/x-www-form-urlencoded\r\n
/// Connection: close\r\n
/// \r\n
/// ```
pub(crate) fn write_prelude(url: &Url, p: &PreludeParams<'_>) -> Vec<u8> {
    let mut w = Vec::with_capacity(256);

    // Writing to a Vec can't fail.
    let _ = do_write_prelude(&mut w, url, p);

    w
}

fn do_write_prelude(w: &mut Vec<u8>, url: &Url, p: &PreludeParams<'_>) -> io::Result<()> {
    let target = request_target(url, p.extra_query);

    write!(w, "{} {} {:?}\r\n", p.method, target, Version::HTTP_11)?;
    write!(w, "Host: {}\r\n", url.host())?;
    write!(w, "User-Agent: {}\r\n", p.user_agent)?;

    match p.content_length {
        Some(len) => {
            write!(w, "Content-Type: text/plain\r\n")?;
            write!(w, "Content-Length: {}\r\n", len)?;
        }
        None => {
            write!(w, "Content-Type: application/x-www-form-urlencoded\r\n")?;
        }
    }

    write!(w, "Connection: close\r\n\r\n")
}

/// Escaped path followed by the query, if there is one.
///
/// The url's own query and the extra parameters are joined by `&`. Neither
/// is escaped, they are expected to be formatted by the caller.
pub(crate) fn request_target(url: &Url, extra_query: &str) -> String {
    let mut target = escape_path(url.path());

    let query: Vec<&str> = url
        .query()
        .into_iter()
        .chain(Some(extra_query))
        .filter(|q| !q.is_empty())
        .collect();

    if !query.is_empty() {
        target.push('?');
        target.push_str(&query.join("&"));
    }

    target
}

/// Percent escape everything in a path except `[A-Za-z0-9/?.=-]`.
///
/// `&` is escaped here since it only has meaning in the query.
pub(crate) fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());

    for b in path.bytes() {
        if is_path_safe(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0xf) as usize] as char);
        }
    }

    out
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn is_path_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'/' | b'?' | b'.' | b'=' | b'-')
}

/// Bytes staged for sending, possibly over several ticks.
#[derive(Debug, Default)]
pub(crate) struct Outgoing {
    buf: Vec<u8>,
    pos: usize,
}

impl Outgoing {
    pub fn new(buf: Vec<u8>) -> Self {
        Outgoing { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Send what the stream accepts. `Ok(true)` once everything is sent.
    pub fn flush<S: Stream>(&mut self, stream: &mut S) -> Result<bool, Error> {
        while !self.is_empty() {
            match stream.send(&self.buf[self.pos..]) {
                Ok(0) => return Err(Error::Send(io::ErrorKind::WriteZero.into())),
                Ok(n) => {
                    trace!("Sent {} prelude bytes", n);
                    self.pos += n;
                }
                Err(e) if is_would_block(&e) => return Ok(false),
                Err(e) => return Err(Error::Send(e)),
            }
        }

        Ok(true)
    }
}
