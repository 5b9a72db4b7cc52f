use std::io;

use super::BoxError;
use super::helpers::TimedOut;
use super::types::{Error, Kind};

/// Creates an `Error` for invalid configuration.
pub fn config<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Config).with(e.into())
}

/// Creates an `Error` for a connectivity failure.
pub fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e.into())
}

/// Creates an `Error` for an unusable proxy reply.
pub fn protocol<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Protocol).with(e.into())
}

/// Creates an `Error` for TLS setup or handshake failures.
pub fn tls<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Tls).with(e.into())
}

/// Creates an `Error` for a failed hostname lookup.
pub fn resolve<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Resolve).with(e.into())
}

/// Creates an `Error` for an exceeded dial budget.
pub fn timeout() -> Error {
    Error::new(Kind::Timeout).with(TimedOut)
}

/// Maps socket errors onto the taxonomy: timeouts stay timeouts, the rest is
/// connectivity.
pub fn from_io(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::new(Kind::Timeout).with(e),
        _ => connect(e),
    }
}

/// Like [`from_io`], but for failures after the proxy accepted the TCP
/// connection: a peer that hangs up mid-handshake is a protocol problem.
pub fn from_handshake_io(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => protocol(e),
        _ => from_io(e),
    }
}
