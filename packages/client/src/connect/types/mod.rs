//! Connection and destination types shared by the dial paths
//!
//! - `connection`: plain/TLS stream wrappers and [`DialedConnection`]
//! - `rewind`: replay of bytes read past a proxy acknowledgement
//! - `target`: tunnel requests and ordered host candidates

pub mod connection;
pub mod rewind;
pub mod target;

pub use connection::{Connection, DialedConnection, RawStream};
pub use rewind::Rewind;
pub use target::{HostCandidates, TunnelRequest};
