//! Owned, scheme optional url.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

use crate::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UrlError {
    #[error("empty url")]
    Empty,
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("too short hostname")]
    TooShortHost,
    #[error("unterminated ipv6 host")]
    UnterminatedIpv6,
    #[error("port is not a number")]
    PortNotANumber,
    #[error("user/password is not supported")]
    UserInfo,
}

/// A target for a transfer.
///
/// The scheme is optional. `http://host.test/a`, `host.test/a` and
/// `host.test:8080/a?b=c` are all accepted. The only accepted scheme is `http`.
/// Fragments are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    host: String,
    port: Option<u16>,
    path: String,
    query: Option<String>,
}

impl Url {
    pub fn parse_str(s: &str) -> Result<Self, UrlError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(UrlError::Empty);
        }

        let x = match scheme_end(s) {
            Some(n) => {
                let scheme = &s[..n];
                if !scheme.eq_ignore_ascii_case("http") {
                    return Err(UrlError::UnsupportedScheme(scheme.to_string()));
                }
                &s[n + 3..]
            }
            None => s,
        };

        // Fragments never go on the wire.
        let x = x.split('#').next().unwrap_or("");

        let authority_end = x.find(|c: char| c == '/' || c == '?').unwrap_or(x.len());
        let (authority, rest) = x.split_at(authority_end);

        if authority.contains('@') {
            return Err(UrlError::UserInfo);
        }

        let (host, port) = split_host_port(authority)?;

        let mut url = Url {
            host: host.to_string(),
            port,
            ..Default::default()
        };
        url.set_path_and_query(rest);

        Ok(url)
    }

    /// Host as it goes in the `Host` header. IPv6 hosts keep their brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host as handed to name lookup.
    pub fn hostname(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The host as an ip address, if it is a literal.
    pub fn ip(&self) -> Option<IpAddr> {
        self.hostname().parse().ok()
    }

    /// The url without query and with the port reset to the default.
    ///
    /// This is what redirect locations are resolved against.
    pub fn base(&self) -> Url {
        Url {
            host: self.host.clone(),
            port: None,
            path: self.path.clone(),
            query: None,
        }
    }

    /// Resolve a `Location` value against this url.
    ///
    /// * `http://b.test/x` and `//b.test/x` replace everything.
    /// * `/x` replaces path and query.
    /// * `x` is relative to the directory of the current path.
    pub fn join(&self, location: &str) -> Result<Url, UrlError> {
        let location = location.trim();

        if location.is_empty() {
            return Err(UrlError::Empty);
        }

        if scheme_end(location).is_some() {
            return Url::parse_str(location);
        }

        if let Some(rest) = location.strip_prefix("//") {
            return Url::parse_str(rest);
        }

        let mut url = Url {
            host: self.host.clone(),
            port: self.port,
            ..Default::default()
        };

        let location = location.split('#').next().unwrap_or("");

        if let Some(query) = location.strip_prefix('?') {
            url.path = self.path.clone();
            url.query = non_empty(query);
        } else if location.starts_with('/') {
            url.set_path_and_query(location);
        } else {
            let dir_end = self.path.rfind('/').map(|n| n + 1).unwrap_or(0);
            let dir = self.path[..dir_end].trim_start_matches('/');
            url.set_path_and_query(&format!("/{}{}", dir, location));
        }

        Ok(url)
    }

    fn set_path_and_query(&mut self, rest: &str) {
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, non_empty(q)),
            None => (rest, None),
        };

        self.path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        self.query = query;
    }
}

fn split_host_port(authority: &str) -> Result<(&str, Option<u16>), UrlError> {
    let (host, port_str) = if authority.starts_with('[') {
        let end = authority.find(']').ok_or(UrlError::UnterminatedIpv6)?;
        let (host, after) = authority.split_at(end + 1);
        (host, after.strip_prefix(':'))
    } else {
        match authority.split_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (authority, None),
        }
    };

    if host.is_empty() || host == "[]" {
        return Err(UrlError::TooShortHost);
    }

    let port = port_str
        .map(|p| p.parse::<u16>().map_err(|_| UrlError::PortNotANumber))
        .transpose()?;

    Ok((host, port))
}

/// Position of a `://` that ends a scheme, not one inside a path or query.
fn scheme_end(s: &str) -> Option<usize> {
    let n = s.find("://")?;
    let first_delim = s.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(s.len());
    (n < first_delim).then_some(n)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}", self.host)?;
        if let Some(port) = self.port.filter(|p| *p != DEFAULT_PORT) {
            write!(f, ":{}", port)?;
        }
        write!(f, "{}", self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}
