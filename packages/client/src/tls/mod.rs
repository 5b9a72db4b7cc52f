//! TLS configuration for the dial path
//!
//! [`build_tls_config`] turns PEM material into a shared [`TlsConfig`].
//! Applying it to a dialed stream lives in `connect::tcp::tls_connections`.

mod client_auth;
mod pem;
mod tls_manager;
mod types;
mod verifier;

pub use tls_manager::{build_tls_config, tls_config_from_pem};
pub use types::{TlsConfig, TlsMaterial};
