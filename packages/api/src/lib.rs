//! # cqltunnel
//!
//! Cluster configuration for CQL clients that reach their nodes through a
//! forward proxy.
//!
//! [`Settings`] describes what the operator configured; [`Settings::into_cluster`]
//! resolves the proxy, installs DNS-through-proxy, the matching dialer, TLS
//! and credentials, in that order, onto a [`Cluster`]. The dial machinery
//! itself lives in [`cqltunnel_client`].
//!
//! ```no_run
//! use cqltunnel::{Settings, client::proxy::ProcessEnv};
//!
//! # fn main() -> cqltunnel::Result<()> {
//! let settings = Settings::from_json(r#"{"host": "10.0.0.5:9042", "proxy_url": "socks5://10.0.0.1:1080"}"#)?
//!     .with_env_defaults(&ProcessEnv);
//! let mut cluster = settings.into_cluster(&ProcessEnv)?;
//! let session = cluster.create_session()?;
//! println!("connected to {}", session.address());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod cluster;
pub mod settings;

pub use cluster::{
    Cluster, ClusterConfig, DEFAULT_CQL_PORT, DEFAULT_SYSTEM_AUTH_KEYSPACE, PasswordAuthenticator,
    resolve_proxy,
};
pub use settings::{HOST_ENV_VAR, Settings, TlsSettings, UserPassSettings};

pub use cqltunnel_client as client;
pub use cqltunnel_client::{DialOptions, DialedConnection, Error, Kind, Result};
