use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `cqltunnel_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur while building or walking the dial path.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid proxy address, TLS material or dial input. Fatal at setup.
    Config,
    /// Proxy or destination unreachable, including exhausted candidate lists
    Connect,
    /// The proxy answered with something other than a usable tunnel
    Protocol,
    /// Key pairing or handshake failures
    Tls,
    /// A dial step ran past its budget
    Timeout,
    /// Hostname lookup failed
    Resolve,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// The attached cause, for downcasting to the diagnostic types in
    /// [`crate::error::helpers`].
    #[must_use]
    pub fn get_ref(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.source.as_deref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("cqltunnel_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.inner.kind {
            Kind::Config => "configuration error",
            Kind::Connect => "connection error",
            Kind::Protocol => "proxy protocol error",
            Kind::Tls => "tls error",
            Kind::Timeout => "dial timed out",
            Kind::Resolve => "name resolution error",
        };
        match self.inner.source {
            Some(ref source) => write!(f, "{prefix}: {source}"),
            None => f.write_str(prefix),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
