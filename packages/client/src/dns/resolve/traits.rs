//! Hostname resolution trait

use std::fmt;
use std::net::SocketAddr;

use crate::error::Result;

/// Resolves a host name to socket addresses for `port`.
///
/// Implementations return IP literals unchanged and report a lookup with no
/// usable records as an error rather than an empty list.
pub trait Resolve: fmt::Debug + Send + Sync + 'static {
    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>>;
}
