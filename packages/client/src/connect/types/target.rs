//! Dial destinations: a single tunnel request and the ordered candidate list

use std::fmt;
use std::str::FromStr;

use http::uri::Authority;

use crate::error::{self, Result};
use crate::proxy::join_host_port;

/// Destination of one dial attempt through a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    pub host: String,
    pub port: u16,
}

impl TunnelRequest {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `host:port` (or `[v6]:port`) destination. The port is required.
    pub fn parse(addr: &str) -> Result<Self> {
        let authority = Authority::from_str(addr.trim())
            .map_err(|e| error::config(format!("invalid destination address {addr:?}: {e}")))?;
        let port = authority
            .port_u16()
            .ok_or_else(|| error::config(format!("destination address {addr:?} has no port")))?;
        let host = authority.host().trim_start_matches('[').trim_end_matches(']');
        Ok(Self::new(host, port))
    }

    /// `host:port` as written on the wire.
    #[must_use]
    pub fn authority(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

impl fmt::Display for TunnelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

/// Ordered `host:port` list tried for one logical connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCandidates(Vec<String>);

impl HostCandidates {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(hosts.into_iter().map(Into::into).collect())
    }

    pub fn single(addr: impl Into<String>) -> Self {
        Self(vec![addr.into()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for HostCandidates {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for HostCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_destination() {
        let request = TunnelRequest::parse("10.0.0.5:9042").unwrap();
        assert_eq!(request, TunnelRequest::new("10.0.0.5", 9042));
        assert_eq!(request.authority(), "10.0.0.5:9042");
    }

    #[test]
    fn test_parse_ipv6_destination() {
        let request = TunnelRequest::parse("[fd00::5]:9042").unwrap();
        assert_eq!(request.host, "fd00::5");
        assert_eq!(request.authority(), "[fd00::5]:9042");
    }

    #[test]
    fn test_port_is_required() {
        let err = TunnelRequest::parse("scylla-server").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_candidates_display_in_order() {
        let candidates = HostCandidates::new(["10.0.0.5:9042", "10.0.0.6:9042"]);
        assert_eq!(candidates.to_string(), "10.0.0.5:9042, 10.0.0.6:9042");
        assert_eq!(candidates.len(), 2);
    }
}
