//! Blocking socket-level dial steps
//!
//! Direct TCP connects, the two proxy handshakes (HTTP CONNECT, SOCKS5) and
//! the TLS upgrade. Every step is bounded by the caller's [`DialOptions`].
//!
//! [`DialOptions`]: crate::config::DialOptions

pub mod basic_connection;
pub mod http_connect;
pub mod socks_protocol;
pub mod tls_connections;

pub use basic_connection::{connect_tcp, connect_to_address_list};
pub use http_connect::{dial_tunnel, establish_connect_tunnel};
pub use socks_protocol::{dial_socks5, socks5_handshake};
pub use tls_connections::{establish_rustls_connection, upgrade_dialed};
