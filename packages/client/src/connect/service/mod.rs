//! Dialers handed to the cluster handle
//!
//! [`ProxyDialer`] is the one proxy capability; [`AddressDialer`] and
//! [`SocksHostDialer`] adapt it to the [`Dialer`] and [`HostDialer`]
//! extension points. [`DirectDialer`] covers the no-proxy case.

pub mod core;
pub mod direct;
pub mod interface;
pub mod proxy;

pub use self::core::{ProxyDialer, first_reachable};
pub use direct::DirectDialer;
pub use interface::{Dialer, HostDialer};
pub use proxy::{AddressDialer, SocksHostDialer};
