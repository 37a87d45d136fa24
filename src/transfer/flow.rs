use std::fmt;
use std::io::{self, Write};
use std::mem;
use std::net::SocketAddr;
use std::time::Duration;

use http::header::{CONTENT_LENGTH, LOCATION};
use http::Response;

use crate::net::{is_would_block, Lookup, Network, Stream};
use crate::parser::parse_response_head;
use crate::request::{write_prelude, Outgoing, PreludeParams};
use crate::url::Url;
use crate::{Error, CONNECT_TIMEOUT, DEFAULT_PORT, MAX_HEAD_SIZE, RECV_BUFFER_SIZE};

use super::config::{RequestMethod, TransferConfig};

/// Phase of a [`Transfer`].
///
/// `Error` and `Closed` are terminal. Every other state except `Initialized`
/// means the transfer is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Error,
    Initialized,
    Resolving,
    Resolved,
    Connecting,
    ReceivingHeader,
    ParsingHeader,
    ReceivingData,
    PostPayload,
    Closed,
}

impl State {
    pub fn is_finished(&self) -> bool {
        matches!(self, State::Error | State::Closed)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Each variant owns what is only valid in that phase. Moving out of a phase
// drops its lookup or stream.
enum Phase<N: Network> {
    Initialized,
    Resolving(N::Lookup),
    Resolved(SocketAddr),
    Connecting(N::Stream),
    PostPayload(N::Stream),
    ReceivingHeader(N::Stream, Vec<u8>),
    ParsingHeader(N::Stream, Vec<u8>),
    ReceivingData(N::Stream),
    Closed,
    Error,
}

impl<N: Network> Phase<N> {
    fn state(&self) -> State {
        match self {
            Phase::Initialized => State::Initialized,
            Phase::Resolving(_) => State::Resolving,
            Phase::Resolved(_) => State::Resolved,
            Phase::Connecting(_) => State::Connecting,
            Phase::PostPayload(_) => State::PostPayload,
            Phase::ReceivingHeader(_, _) => State::ReceivingHeader,
            Phase::ParsingHeader(_, _) => State::ParsingHeader,
            Phase::ReceivingData(_) => State::ReceivingData,
            Phase::Closed => State::Closed,
            Phase::Error => State::Error,
        }
    }
}

/// A single HTTP/1.1 request/response, driven by [`Transfer::tick`].
///
/// The response body is written to the sink `W`.
pub struct Transfer<N: Network, W> {
    network: N,
    config: TransferConfig,
    phase: Phase<N>,
    url: Url,
    port_override: Option<u16>,
    sink: Option<W>,
    payload: Vec<u8>,
    amount_posted: usize,
    redirects_left: u32,
    elapsed: Duration,
    addr: Option<SocketAddr>,
    outgoing: Outgoing,
    response: Option<Response<()>>,
    bytes_remaining: u64,
    last_error: Option<Error>,
}

impl<N: Network, W: Write> Transfer<N, W> {
    pub fn new(network: N, config: TransferConfig) -> Self {
        Transfer {
            network,
            redirects_left: config.max_redirects,
            config,
            phase: Phase::Initialized,
            url: Url::default(),
            port_override: None,
            sink: None,
            payload: Vec::new(),
            amount_posted: 0,
            elapsed: Duration::ZERO,
            addr: None,
            outgoing: Outgoing::default(),
            response: None,
            bytes_remaining: 0,
            last_error: None,
        }
    }

    /// Stage the body of a POST. Call before [`Transfer::start`].
    pub fn copy_payload(&mut self, payload: &[u8]) {
        self.payload.clear();
        self.payload.extend_from_slice(payload);
    }

    /// Begin a transfer of `url`, writing the response body to `sink`.
    ///
    /// A missing sink fails the transfer right away. The port is taken from
    /// `port_override`, else the url, else 80.
    ///
    /// Starting while another transfer is running drops the running one.
    pub fn start(&mut self, url: &str, sink: Option<W>, port_override: Option<u16>) {
        if self.is_active() {
            warn!("Start of {} drops running transfer of {}", url, self.url);
        }

        self.reset();
        self.port_override = port_override;
        self.redirects_left = self.config.max_redirects;

        let url = match Url::parse_str(url) {
            Ok(v) => v,
            Err(e) => return self.fail(State::Initialized, e.into()),
        };

        let Some(sink) = sink else {
            self.url = url;
            return self.fail(State::Initialized, Error::MissingSink);
        };
        self.sink = Some(sink);

        debug!("Start {} {}", self.config.method.as_method(), url);

        let next = self.begin_resolve(url);
        self.enter(State::Initialized, next);
    }

    /// Do the next unit of non-blocking work.
    ///
    /// `delta` is the time since the previous tick. It drives the timeouts.
    pub fn tick(&mut self, delta: Duration) {
        if !self.is_active() {
            return;
        }

        self.elapsed += delta;

        let from = self.phase.state();
        let phase = mem::replace(&mut self.phase, Phase::Error);

        match self.step(phase) {
            Ok(next) => self.enter(from, next),
            Err(e) => self.fail(from, e),
        }

        let timeout = self.config.connection_timeout;

        if self.is_active() && self.elapsed > timeout {
            let from = self.phase.state();
            self.fail(from, Error::Timeout(timeout));
        }
    }

    pub fn state(&self) -> State {
        self.phase.state()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Why the transfer is in [`State::Error`].
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The response head, once a `200` has been parsed.
    pub fn response(&self) -> Option<&Response<()>> {
        self.response.as_ref()
    }

    /// Current target. Changes when following redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn resolved_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    pub fn bytes_remaining(&self) -> u64 {
        self.bytes_remaining
    }

    pub fn amount_posted(&self) -> usize {
        self.amount_posted
    }

    pub fn redirects_left(&self) -> u32 {
        self.redirects_left
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn sink(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    pub fn take_sink(&mut self) -> Option<W> {
        self.sink.take()
    }

    fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Initialized | Phase::Closed | Phase::Error)
    }

    fn reset(&mut self) {
        self.phase = Phase::Initialized;
        self.url = Url::default();
        self.sink = None;
        self.amount_posted = 0;
        self.elapsed = Duration::ZERO;
        self.addr = None;
        self.outgoing = Outgoing::default();
        self.response = None;
        self.bytes_remaining = 0;
        self.last_error = None;
    }

    fn enter(&mut self, from: State, next: Phase<N>) {
        let to = next.state();
        if from != to {
            debug!("{} -> {}", from, to);
        }
        self.phase = next;
    }

    fn fail(&mut self, from: State, e: Error) {
        warn!("Transfer of {} failed in {}: {}", self.url, from, e);
        debug!("{} -> {}", from, State::Error);

        self.phase = Phase::Error;
        self.outgoing = Outgoing::default();
        self.last_error = Some(e);
    }

    fn target_port(&self) -> u16 {
        self.port_override
            .or(self.url.port())
            .unwrap_or(DEFAULT_PORT)
    }

    fn step(&mut self, phase: Phase<N>) -> Result<Phase<N>, Error> {
        match phase {
            Phase::Resolving(lookup) => self.resolving(lookup),
            Phase::Resolved(addr) => self.resolved(addr),
            Phase::Connecting(stream) => self.connecting(stream),
            Phase::PostPayload(stream) => self.post_payload(stream),
            Phase::ReceivingHeader(stream, head) => self.receiving_header(stream, head),
            Phase::ParsingHeader(stream, head) => self.parsing_header(stream, head),
            Phase::ReceivingData(stream) => self.receiving_data(stream),
            Phase::Initialized | Phase::Closed | Phase::Error => Ok(phase),
        }
    }

    // //////////////////////////////////////////////////////////////////////////////// RESOLVE

    fn begin_resolve(&mut self, url: Url) -> Phase<N> {
        self.url = url;
        self.elapsed = Duration::ZERO;

        match self.url.ip() {
            Some(ip) => {
                let addr = SocketAddr::new(ip, self.target_port());
                self.addr = Some(addr);
                Phase::Resolved(addr)
            }
            None => Phase::Resolving(self.network.lookup(self.url.hostname())),
        }
    }

    fn resolving(&mut self, mut lookup: N::Lookup) -> Result<Phase<N>, Error> {
        let Some(result) = lookup.poll() else {
            return Ok(Phase::Resolving(lookup));
        };

        let ip = result.map_err(|e| Error::Resolve(self.url.hostname().to_string(), e))?;
        let addr = SocketAddr::new(ip, self.target_port());

        debug!("Resolved {} to {}", self.url.hostname(), addr);
        self.addr = Some(addr);

        Ok(Phase::Resolved(addr))
    }

    // //////////////////////////////////////////////////////////////////////////////// CONNECT

    fn resolved(&mut self, addr: SocketAddr) -> Result<Phase<N>, Error> {
        self.elapsed = Duration::ZERO;

        let stream = self.network.connect(addr).map_err(Error::Connect)?;

        Ok(Phase::Connecting(stream))
    }

    fn connecting(&mut self, mut stream: N::Stream) -> Result<Phase<N>, Error> {
        match stream.poll_connected() {
            Ok(true) => {}
            Ok(false) if self.elapsed >= CONNECT_TIMEOUT => {
                return Err(Error::ConnectTimeout(CONNECT_TIMEOUT));
            }
            Ok(false) => return Ok(Phase::Connecting(stream)),
            Err(e) => return Err(Error::Connect(e)),
        }

        let method = self.config.method.as_method();
        let user_agent = self.config.user_agent_string();

        let content_length = match self.config.method {
            RequestMethod::Get => None,
            RequestMethod::Post => Some(self.payload.len()),
        };

        let prelude = write_prelude(
            &self.url,
            &PreludeParams {
                method: &method,
                extra_query: &self.config.extra_url_parameters,
                user_agent: &user_agent,
                content_length,
            },
        );

        trace!("Request prelude: {:?}", String::from_utf8_lossy(&prelude));

        self.outgoing = Outgoing::new(prelude);
        self.outgoing.flush(&mut stream)?;

        Ok(match self.config.method {
            RequestMethod::Get => Phase::ReceivingHeader(stream, Vec::new()),
            RequestMethod::Post => Phase::PostPayload(stream),
        })
    }

    // //////////////////////////////////////////////////////////////////////////////// POST PAYLOAD

    fn post_payload(&mut self, mut stream: N::Stream) -> Result<Phase<N>, Error> {
        if !self.outgoing.flush(&mut stream)? {
            return Ok(Phase::PostPayload(stream));
        }

        let total = self.payload.len();

        if self.amount_posted < total {
            let end = total.min(self.amount_posted.saturating_add(self.config.post_chunk_size));

            match stream.send(&self.payload[self.amount_posted..end]) {
                Ok(0) => return Err(Error::Send(io::ErrorKind::WriteZero.into())),
                Ok(n) => {
                    self.amount_posted += n;
                    trace!("Posted {}/{} bytes", self.amount_posted, total);
                }
                Err(e) if is_would_block(&e) => trace!("Post would block"),
                Err(e) => return Err(Error::Send(e)),
            }
        }

        if self.amount_posted < total {
            return Ok(Phase::PostPayload(stream));
        }

        Ok(Phase::ReceivingHeader(stream, Vec::new()))
    }

    // //////////////////////////////////////////////////////////////////////////////// RECV HEADER

    fn receiving_header(
        &mut self,
        mut stream: N::Stream,
        mut head: Vec<u8>,
    ) -> Result<Phase<N>, Error> {
        if !self.outgoing.flush(&mut stream)? {
            return Ok(Phase::ReceivingHeader(stream, head));
        }

        // One byte at a time to never read into the body.
        let mut byte = [0_u8; 1];

        loop {
            match stream.recv(&mut byte) {
                Ok(0) => return Err(Error::PeerClosed),
                Ok(_) => {
                    head.push(byte[0]);

                    if head.ends_with(b"\r\n\r\n") {
                        return Ok(Phase::ParsingHeader(stream, head));
                    }

                    if head.len() > MAX_HEAD_SIZE {
                        return Err(Error::HeadTooLarge(MAX_HEAD_SIZE));
                    }
                }
                Err(e) if is_would_block(&e) => return Ok(Phase::ReceivingHeader(stream, head)),
                Err(e) => return Err(Error::Recv(e)),
            }
        }
    }

    // //////////////////////////////////////////////////////////////////////////////// PARSE HEADER

    fn parsing_header(&mut self, stream: N::Stream, head: Vec<u8>) -> Result<Phase<N>, Error> {
        let response = parse_response_head(&head)?;
        let status = response.status();

        debug!("Response {:?} {}", response.version(), status);

        match status.as_u16() {
            200 => {
                let len = content_length(&response)?;

                self.bytes_remaining = len;
                self.response = Some(response);

                if len == 0 {
                    self.close()
                } else {
                    Ok(Phase::ReceivingData(stream))
                }
            }

            301 | 302 => {
                if self.redirects_left == 0 {
                    return Err(Error::RedirectLimit);
                }

                let location = location(&response)?;

                let url = self
                    .url
                    .base()
                    .join(location)
                    .map_err(|e| Error::BadLocationHeader(format!("{}: {}", location, e)))?;

                self.redirects_left -= 1;
                debug!("Redirect to {} ({} left)", url, self.redirects_left);

                drop(stream);
                self.response = None;
                self.addr = None;
                self.outgoing = Outgoing::default();

                Ok(self.begin_resolve(url))
            }

            100 => Ok(Phase::ReceivingHeader(stream, Vec::new())),

            _ => Err(Error::UnsupportedStatus(status)),
        }
    }

    // //////////////////////////////////////////////////////////////////////////////// RECV DATA

    fn receiving_data(&mut self, mut stream: N::Stream) -> Result<Phase<N>, Error> {
        let mut buf = [0_u8; RECV_BUFFER_SIZE];

        while self.bytes_remaining > 0 {
            let n = match stream.recv(&mut buf) {
                Ok(0) => return Err(Error::PeerClosed),
                Ok(n) => n,
                Err(e) if is_would_block(&e) => return Ok(Phase::ReceivingData(stream)),
                Err(e) => return Err(Error::Recv(e)),
            };

            // Anything past content-length is dropped.
            let amount = (n as u64).min(self.bytes_remaining) as usize;
            if amount < n {
                debug!("Dropping {} bytes past content-length", n - amount);
            }

            let sink = self.sink.as_mut().ok_or(Error::MissingSink)?;
            sink.write_all(&buf[..amount]).map_err(Error::Sink)?;

            self.bytes_remaining -= amount as u64;
            trace!("Received {} bytes, {} left", amount, self.bytes_remaining);
        }

        self.close()
    }

    fn close(&mut self) -> Result<Phase<N>, Error> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush().map_err(Error::Sink)?;
        }

        self.outgoing = Outgoing::default();

        Ok(Phase::Closed)
    }
}

fn content_length(response: &Response<()>) -> Result<u64, Error> {
    let value = response
        .headers()
        .get(CONTENT_LENGTH)
        .ok_or(Error::NoContentLength)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or(Error::BadContentLength)
}

fn location(response: &Response<()>) -> Result<&str, Error> {
    // We want the last Location header.
    let header = response
        .headers()
        .get_all(LOCATION)
        .into_iter()
        .last()
        .ok_or(Error::NoLocationHeader)?;

    header
        .to_str()
        .map_err(|_| Error::BadLocationHeader(String::from_utf8_lossy(header.as_bytes()).into()))
}

impl<N: Network, W> fmt::Debug for Transfer<N, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("state", &self.phase.state())
            .field("url", &self.url.to_string())
            .finish()
    }
}
