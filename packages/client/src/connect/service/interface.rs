//! Extension points a CQL cluster handle accepts for opening node connections

use std::fmt;

use crate::connect::types::{DialedConnection, HostCandidates};
use crate::error::Result;
use crate::tls::TlsConfig;

/// Opens a plain stream to one node address. The cluster applies its own
/// TLS on top.
pub trait Dialer: fmt::Debug + Send + Sync {
    fn dial(&self, addr: &str) -> Result<DialedConnection>;
}

/// Opens a stream to the first reachable candidate and owns the TLS
/// upgrade of what it returns.
pub trait HostDialer: fmt::Debug + Send + Sync {
    fn dial_host(&self, candidates: &HostCandidates) -> Result<DialedConnection>;

    /// Install the TLS configuration applied after each successful dial.
    fn attach_tls(&mut self, tls: TlsConfig);

    fn tls(&self) -> Option<&TlsConfig>;
}
