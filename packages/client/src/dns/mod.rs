//! Host name resolution
//!
//! Lookups go through [`current`]: the system resolver, unless an override
//! such as [`ProxyDnsResolver`] has been installed. Proxy endpoints
//! themselves are always resolved by the system.

pub(crate) mod gai;
pub(crate) mod hickory;
pub(crate) mod resolve;

pub use gai::GaiResolver;
pub use hickory::{DNS_PORT, ProxyDnsResolver, install_proxy_dns};
pub use resolve::{Resolve, clear, current, install, installed, lookup_host};
