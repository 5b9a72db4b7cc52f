//! Client certificate for mutual TLS

use std::sync::Arc;

use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{InconsistentKeys, SignatureScheme};

use crate::error::{self, Result};

/// Hands out the same certificate and key for every handshake.
#[derive(Debug)]
pub(crate) struct FixedClientCert {
    key: Arc<CertifiedKey>,
}

impl FixedClientCert {
    pub(crate) fn new(
        chain: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
        provider: &CryptoProvider,
    ) -> Result<Self> {
        let signing_key = provider
            .key_provider
            .load_private_key(key)
            .map_err(|e| error::tls(format!("unable to load client key: {e}")))?;
        let certified = CertifiedKey::new(chain, signing_key);

        match certified.keys_match() {
            Ok(()) => {}
            // The provider could not extract a public key to compare; let the
            // handshake decide.
            Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {
                tracing::debug!("client key consistency could not be checked");
            }
            Err(e) => {
                return Err(error::tls(format!(
                    "client certificate and key do not match: {e}"
                )));
            }
        }

        Ok(Self {
            key: Arc::new(certified),
        })
    }
}

impl ResolvesClientCert for FixedClientCert {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.key))
    }

    fn has_certs(&self) -> bool {
        true
    }
}
