//! Shared proxy dial capability
//!
//! Both dialer shapes reduce to [`ProxyDialer`]: one tunnel per address,
//! candidates walked strictly in order.

use std::sync::Arc;

use crate::config::DialOptions;
use crate::connect::tcp::{dial_socks5, dial_tunnel};
use crate::connect::types::{DialedConnection, HostCandidates, TunnelRequest};
use crate::error::{self, CandidatesExhausted, Result};
use crate::proxy::{ProxyScheme, ProxyTarget};

/// Dials destinations through one fixed proxy.
#[derive(Debug, Clone)]
pub struct ProxyDialer {
    target: Arc<ProxyTarget>,
    options: DialOptions,
}

impl ProxyDialer {
    pub fn new(target: ProxyTarget) -> Self {
        Self {
            target: Arc::new(target),
            options: DialOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DialOptions) -> Self {
        self.options = options;
        self
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    pub fn options(&self) -> &DialOptions {
        &self.options
    }

    /// Open a tunnel to one `host:port`, using the handshake the proxy
    /// scheme calls for.
    pub fn dial_addr(&self, addr: &str) -> Result<DialedConnection> {
        let request = TunnelRequest::parse(addr)?;
        match self.target.scheme {
            ProxyScheme::Http => dial_tunnel(&self.target, &request, &self.options),
            ProxyScheme::Socks5 => dial_socks5(&self.target, &request, &self.options),
        }
    }

    /// First candidate the proxy can reach, in list order.
    pub fn dial(&self, candidates: &HostCandidates) -> Result<DialedConnection> {
        first_reachable(candidates, |addr| self.dial_addr(addr))
    }
}

/// Try `dial` on each candidate in order and return the first success.
///
/// No racing and no retries. When every candidate fails the error is a
/// single [`CandidatesExhausted`] listing each candidate with its cause.
pub fn first_reachable<F>(candidates: &HostCandidates, mut dial: F) -> Result<DialedConnection>
where
    F: FnMut(&str) -> Result<DialedConnection>,
{
    if candidates.is_empty() {
        return Err(error::config("no host candidates to dial"));
    }

    let mut failures = Vec::with_capacity(candidates.len());
    for candidate in candidates.iter() {
        match dial(candidate) {
            Ok(conn) => {
                tracing::debug!("dialed {}", conn.address());
                return Ok(conn);
            }
            Err(e) => {
                tracing::warn!("unable to dial {}: {}", candidate, e);
                failures.push((candidate.to_string(), e.to_string()));
            }
        }
    }

    Err(error::connect(CandidatesExhausted {
        candidates: candidates.as_slice().to_vec(),
        failures,
    }))
}
