//! # cqltunnel client
//!
//! Dial machinery for reaching CQL cluster nodes through a forward proxy.
//!
//! ## Features
//!
//! - **Proxy discovery** from an explicit URL or `HTTPS_PROXY`/`HTTP_PROXY`
//! - **HTTP CONNECT tunnels** that keep bytes pipelined after the `200`
//! - **SOCKS5 host dialing** over an ordered candidate list, no racing
//! - **DNS over TCP through the proxy**, installable process-wide
//! - **Rustls TLS upgrade** with a custom CA, optional mutual TLS and an
//!   opt-out of host name matching that still validates the chain
//!
//! All I/O is blocking with per-step timeouts taken from [`DialOptions`].
//!
//! ## Usage
//!
//! ```no_run
//! use cqltunnel_client::{HostCandidates, HostDialer, SocksHostDialer, proxy};
//!
//! # fn main() -> cqltunnel_client::Result<()> {
//! let target = proxy::resolve_host_proxy(Some("socks5://10.0.0.1:1080"), &proxy::ProcessEnv)?
//!     .expect("explicit proxy");
//! let dialer = SocksHostDialer::new(target)?;
//! let conn = dialer.dial_host(&HostCandidates::new(["10.0.0.5:9042", "10.0.0.6:9042"]))?;
//! println!("connected to {}", conn.address());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod dns;
pub mod error;
pub mod proxy;
pub mod tls;

pub use config::{DEFAULT_DIAL_TIMEOUT, DialOptions};
pub use connect::{
    AddressDialer, Connection, DialedConnection, Dialer, DirectDialer, HostCandidates,
    HostDialer, ProxyDialer, SocksHostDialer, TunnelRequest,
};
pub use dns::{ProxyDnsResolver, Resolve};
pub use error::{Error, Kind, Result};
pub use proxy::{ProxyAuth, ProxyScheme, ProxyTarget};
pub use tls::{TlsConfig, TlsMaterial, build_tls_config};
