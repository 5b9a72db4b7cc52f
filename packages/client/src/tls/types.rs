//! TLS inputs and the built client configuration

use std::fmt;
use std::sync::Arc;

use rustls::ClientConfig;

/// PEM material supplied by the operator. Set once, read by every dial.
#[derive(Clone, Default)]
pub struct TlsMaterial {
    pub ca_certificate: Vec<u8>,
    pub client_certificate: Option<Vec<u8>>,
    pub client_key: Option<Vec<u8>>,
    skip_host_verification: bool,
}

impl TlsMaterial {
    pub fn new(ca_certificate: impl Into<Vec<u8>>) -> Self {
        Self {
            ca_certificate: ca_certificate.into(),
            ..Self::default()
        }
    }

    /// Present a client certificate (mutual TLS). Empty inputs are ignored.
    #[must_use]
    pub fn with_client_identity(
        mut self,
        certificate: impl Into<Vec<u8>>,
        key: impl Into<Vec<u8>>,
    ) -> Self {
        self.client_certificate = Some(certificate.into()).filter(|pem| !pem.is_empty());
        self.client_key = Some(key.into()).filter(|pem| !pem.is_empty());
        self
    }

    /// Skip matching the server certificate against the dialed host name.
    #[must_use]
    pub fn with_skip_host_verification(mut self, skip: bool) -> Self {
        self.skip_host_verification = skip;
        self
    }

    pub fn skips_host_verification(&self) -> bool {
        self.skip_host_verification
    }

    /// Always the negation of the skip flag.
    pub fn host_verification(&self) -> bool {
        !self.skip_host_verification
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca_certificate", &format_args!("{} bytes", self.ca_certificate.len()))
            .field("client_certificate", &self.client_certificate.is_some())
            .field("client_key", &self.client_key.as_ref().map(|_| "<redacted>"))
            .field("skip_host_verification", &self.skip_host_verification)
            .finish()
    }
}

/// Client configuration built from [`TlsMaterial`], shared by every upgrade.
#[derive(Clone)]
pub struct TlsConfig {
    client_config: Arc<ClientConfig>,
    skip_host_verification: bool,
    mutual: bool,
}

impl TlsConfig {
    pub(crate) fn new(client_config: Arc<ClientConfig>, skip_host_verification: bool, mutual: bool) -> Self {
        Self {
            client_config,
            skip_host_verification,
            mutual,
        }
    }

    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.client_config)
    }

    pub fn host_verification(&self) -> bool {
        !self.skip_host_verification
    }

    pub fn skips_host_verification(&self) -> bool {
        self.skip_host_verification
    }

    /// Whether a client certificate is presented.
    pub fn is_mutual(&self) -> bool {
        self.mutual
    }
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("host_verification", &self.host_verification())
            .field("mutual", &self.mutual)
            .finish_non_exhaustive()
    }
}
