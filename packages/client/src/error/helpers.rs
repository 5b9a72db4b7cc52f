use std::fmt;

use thiserror::Error;

/// A marker type to indicate that a dial step timed out.
#[derive(Debug)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl std::error::Error for TimedOut {}

/// The proxy answered the CONNECT request with a non-200 status.
#[derive(Debug, Error)]
#[error("proxy refused tunnel to {destination}: {status}")]
pub struct TunnelRejected {
    pub destination: String,
    /// Status code and reason phrase exactly as the proxy sent them.
    pub status: String,
}

/// The proxy's reply could not be parsed as an HTTP response.
#[derive(Debug, Error)]
#[error("malformed proxy response: {0}")]
pub struct MalformedResponse(pub String);

/// The nameserver answered NXDOMAIN.
#[derive(Debug, Error)]
#[error("no such host: {0}")]
pub struct NoSuchHost(pub String);

/// The SOCKS5 server refused the request.
#[derive(Debug, Error)]
#[error("socks5 request to {destination} rejected: {reason} (code {code:#04x})")]
pub struct SocksRejected {
    pub destination: String,
    pub code: u8,
    pub reason: &'static str,
}

/// A TLS upgrade was attempted on a connection that is already encrypted.
#[derive(Debug, Error)]
#[error("connection to {0} is already TLS-wrapped")]
pub struct AlreadyEncrypted(pub String);

/// Every host candidate failed; no connection was produced.
#[derive(Debug, Error)]
pub struct CandidatesExhausted {
    /// The full candidate list, in dial order.
    pub candidates: Vec<String>,
    /// One `(candidate, cause)` pair per attempt.
    pub failures: Vec<(String, String)>,
}

impl fmt::Display for CandidatesExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to dial any of [{}]",
            self.candidates.join(", ")
        )?;
        for (candidate, cause) in &self.failures {
            write!(f, "; {candidate}: {cause}")?;
        }
        Ok(())
    }
}
