//! System resolver (`getaddrinfo` via `ToSocketAddrs`)

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use super::Resolve;
use crate::error::{self, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| error::resolve(format!("failed to resolve {host}: {e}")))?
            .collect();
        if addrs.is_empty() {
            return Err(error::resolve(format!("no addresses found for {host}")));
        }
        Ok(addrs)
    }
}
