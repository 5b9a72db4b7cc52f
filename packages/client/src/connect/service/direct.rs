//! Proxy-less dialing with pluggable name resolution

use std::sync::Arc;

use super::interface::Dialer;
use crate::config::DialOptions;
use crate::connect::tcp::connect_to_address_list;
use crate::connect::types::{Connection, DialedConnection, RawStream, TunnelRequest};
use crate::dns::{self, Resolve};
use crate::error::Result;

/// Plain TCP to the node. Host names go through the given resolver, or the
/// process-wide one when none is set.
#[derive(Debug, Clone, Default)]
pub struct DirectDialer {
    resolver: Option<Arc<dyn Resolve>>,
    options: DialOptions,
}

impl DirectDialer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: DialOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DialOptions {
        &self.options
    }
}

impl Dialer for DirectDialer {
    fn dial(&self, addr: &str) -> Result<DialedConnection> {
        let request = TunnelRequest::parse(addr)?;
        let resolver = self.resolver.clone().unwrap_or_else(dns::current);
        let addrs = resolver.lookup(&request.host, request.port)?;
        tracing::debug!("dialing {} directly ({} addresses)", request, addrs.len());
        let stream = connect_to_address_list(&addrs, &self.options)?;
        Ok(DialedConnection::new(
            Connection::Plain(RawStream::Tcp(stream)),
            request.authority(),
        ))
    }
}
