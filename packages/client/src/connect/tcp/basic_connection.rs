//! Basic TCP connection establishment
//!
//! Bounded connects over a resolved address list, tried in order.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::DialOptions;
use crate::error::{self, Result};

/// Connect to the first reachable address, each attempt bounded by the
/// remaining dial budget.
pub fn connect_to_address_list(addrs: &[SocketAddr], options: &DialOptions) -> Result<TcpStream> {
    let options = options.started();
    let mut last_err = None;

    for addr in addrs {
        let budget = options.budget()?;
        match TcpStream::connect_timeout(addr, budget) {
            Ok(stream) => {
                if options.nodelay {
                    stream.set_nodelay(true).map_err(error::from_io)?;
                }
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Failed to connect to {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(error::from_io(e)),
        None => Err(error::config("no addresses to connect to")),
    }
}

/// Connect to a `host:port` using the system resolver.
///
/// Proxy endpoints are always resolved this way so that a DNS override
/// routed through the proxy never has to resolve the proxy itself.
pub fn connect_tcp(addr: &str, options: &DialOptions) -> Result<TcpStream> {
    let options = &options.started();
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| error::resolve(format!("failed to resolve {addr}: {e}")))?
        .collect();
    if addrs.is_empty() {
        return Err(error::resolve(format!("no addresses found for {addr}")));
    }
    connect_to_address_list(&addrs, options)
}

/// Best-effort close of a socket that failed mid-handshake.
pub(crate) fn abort(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both)
        && e.kind() != io::ErrorKind::NotConnected
    {
        tracing::debug!("shutdown after failed dial: {}", e);
    }
}
