//! Proxy target derivation
//!
//! Turns an explicit proxy setting or the conventional environment variables
//! into a [`ProxyTarget`]. Two resolvers exist because the two dialer shapes
//! accept different schemes: the address dialer tunnels with HTTP CONNECT or
//! SOCKS5, the host dialer only with SOCKS5.

mod env;
mod resolve;
mod types;

pub use env::{EnvSource, PROXY_ENV_VARS, ProcessEnv, proxy_from_env};
pub use resolve::{DialerStyle, detect_style, resolve_address_proxy, resolve_host_proxy};
pub(crate) use types::join_host_port;
pub use types::{ProxyAuth, ProxyScheme, ProxyTarget};
