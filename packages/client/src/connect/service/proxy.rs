//! Proxy-backed implementations of the two dialer shapes

use super::core::ProxyDialer;
use super::interface::{Dialer, HostDialer};
use crate::config::DialOptions;
use crate::connect::tcp::upgrade_dialed;
use crate::connect::types::{DialedConnection, HostCandidates};
use crate::error::{self, Result};
use crate::proxy::{ProxyScheme, ProxyTarget};
use crate::tls::TlsConfig;

/// Per-address dialer: HTTP CONNECT (or SOCKS5) to exactly the address asked
/// for. TLS stays with the cluster.
#[derive(Debug, Clone)]
pub struct AddressDialer {
    proxy: ProxyDialer,
}

impl AddressDialer {
    pub fn new(target: ProxyTarget) -> Self {
        Self {
            proxy: ProxyDialer::new(target),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DialOptions) -> Self {
        self.proxy = self.proxy.with_options(options);
        self
    }

    pub fn proxy(&self) -> &ProxyDialer {
        &self.proxy
    }
}

impl Dialer for AddressDialer {
    fn dial(&self, addr: &str) -> Result<DialedConnection> {
        self.proxy.dial_addr(addr)
    }
}

/// Per-host dialer over SOCKS5. Walks the candidate list and upgrades the
/// winner to TLS when a configuration is attached.
#[derive(Debug, Clone)]
pub struct SocksHostDialer {
    proxy: ProxyDialer,
    tls: Option<TlsConfig>,
}

impl SocksHostDialer {
    pub fn new(target: ProxyTarget) -> Result<Self> {
        if target.scheme != ProxyScheme::Socks5 {
            return Err(error::config(format!(
                "host dialer requires a socks5 proxy, got {target}"
            )));
        }
        Ok(Self {
            proxy: ProxyDialer::new(target),
            tls: None,
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: DialOptions) -> Self {
        self.proxy = self.proxy.with_options(options);
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn proxy(&self) -> &ProxyDialer {
        &self.proxy
    }
}

impl HostDialer for SocksHostDialer {
    fn dial_host(&self, candidates: &HostCandidates) -> Result<DialedConnection> {
        let conn = self.proxy.dial(candidates)?;
        match &self.tls {
            Some(tls) => upgrade_dialed(conn, tls, self.proxy.options()),
            None => Ok(conn),
        }
    }

    fn attach_tls(&mut self, tls: TlsConfig) {
        self.tls = Some(tls);
    }

    fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_ref()
    }
}
