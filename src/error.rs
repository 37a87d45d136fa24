use std::io;

use http::StatusCode;
use thiserror::Error;

use crate::url::UrlError;

/// Reason a transfer ended up in [`State::Error`][crate::State::Error].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("bad url: {0}")]
    BadUrl(#[from] UrlError),

    #[error("no sink to write the response body to")]
    MissingSink,

    #[error("failed to resolve {0}: {1}")]
    Resolve(String, io::Error),

    #[error("failed to connect: {0}")]
    Connect(io::Error),

    #[error("connect did not complete within {0:?}")]
    ConnectTimeout(std::time::Duration),

    #[error("transfer timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("send failed: {0}")]
    Send(io::Error),

    #[error("recv failed: {0}")]
    Recv(io::Error),

    #[error("connection closed by peer")]
    PeerClosed,

    #[error("writing to sink failed: {0}")]
    Sink(io::Error),

    #[error("http parse fail: {0}")]
    HttpParseFail(String),

    #[error("http response head is incomplete")]
    IncompleteHead,

    #[error("http response head larger than {0} bytes")]
    HeadTooLarge(usize),

    #[error("unsupported status: {0}")]
    UnsupportedStatus(StatusCode),

    #[error("missing a content-length header")]
    NoContentLength,

    #[error("content-length header not a number")]
    BadContentLength,

    #[error("missing a location header")]
    NoLocationHeader,

    #[error("location header is malformed: {0}")]
    BadLocationHeader(String),

    #[error("redirect limit reached")]
    RedirectLimit,
}

impl From<httparse::Error> for Error {
    fn from(value: httparse::Error) -> Self {
        Error::HttpParseFail(value.to_string())
    }
}
