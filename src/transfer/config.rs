use std::time::Duration;

use http::Method;

use crate::DEFAULT_POST_CHUNK_SIZE;

/// Verb of the request. Only the two the transfer knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_method(&self) -> Method {
        match self {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
        }
    }
}

/// Configuration of a [`Transfer`][crate::Transfer].
///
/// Comes in two flavors:
///
/// * [`TransferConfig::download`] follows up to `max_redirects` 301/302 hops.
/// * [`TransferConfig::form`] appends extra url parameters to the query and
///   never follows redirects.
///
/// ```
/// use std::time::Duration;
/// use tickhttp::{RequestMethod, TransferConfig};
///
/// let config = TransferConfig::download(Duration::from_secs(30), 5, RequestMethod::Get)
///     .user_agent("game", "1.0.3");
///
/// assert_eq!(config.user_agent_string(), "game-1.0.3");
/// ```
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub(crate) connection_timeout: Duration,
    pub(crate) max_redirects: u32,
    pub(crate) method: RequestMethod,
    pub(crate) extra_url_parameters: String,
    pub(crate) app_name: String,
    pub(crate) app_version: String,
    pub(crate) post_chunk_size: usize,
}

impl TransferConfig {
    /// Redirect aware download.
    pub fn download(
        connection_timeout: Duration,
        max_redirects: u32,
        method: RequestMethod,
    ) -> Self {
        TransferConfig {
            max_redirects,
            ..Self::new(connection_timeout, method)
        }
    }

    /// Request with extra url parameters and no redirects.
    ///
    /// The parameters are appended to the query as is, e.g. `lang=en&v=2`.
    pub fn form(
        connection_timeout: Duration,
        extra_url_parameters: impl Into<String>,
        method: RequestMethod,
    ) -> Self {
        TransferConfig {
            extra_url_parameters: extra_url_parameters.into(),
            ..Self::new(connection_timeout, method)
        }
    }

    fn new(connection_timeout: Duration, method: RequestMethod) -> Self {
        TransferConfig {
            connection_timeout,
            max_redirects: 0,
            method,
            extra_url_parameters: String::new(),
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            post_chunk_size: DEFAULT_POST_CHUNK_SIZE,
        }
    }

    /// Name and version sent as `User-Agent: <app>-<version>`.
    pub fn user_agent(mut self, app: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_name = app.into();
        self.app_version = version.into();
        self
    }

    /// Max payload bytes sent per tick when posting. At least 1.
    pub fn post_chunk_size(mut self, size: usize) -> Self {
        self.post_chunk_size = size.max(1);
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn extra_url_parameters(&self) -> &str {
        &self.extra_url_parameters
    }

    pub fn user_agent_string(&self) -> String {
        format!("{}-{}", self.app_name, self.app_version)
    }
}
