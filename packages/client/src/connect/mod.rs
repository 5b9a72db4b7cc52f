//! Connection establishment
//!
//! - `types`: streams handed back to callers and dial destinations
//! - `tcp`: the blocking protocol steps (TCP, HTTP CONNECT, SOCKS5, TLS)
//! - `service`: the dialers built from those steps

pub mod service;
pub mod tcp;
pub mod types;

pub use service::{
    AddressDialer, Dialer, DirectDialer, HostDialer, ProxyDialer, SocksHostDialer,
    first_reachable,
};
pub use tcp::{dial_socks5, dial_tunnel, establish_rustls_connection, upgrade_dialed};
pub use types::{Connection, DialedConnection, HostCandidates, RawStream, Rewind, TunnelRequest};
