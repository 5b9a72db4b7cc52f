//! PEM decoding for trust roots and client identity

use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::error::{self, Result};

pub(crate) fn parse_trust_roots(pem: &[u8]) -> Result<RootCertStore> {
    if pem.trim_ascii().is_empty() {
        return Err(error::config("CA certificate is empty"));
    }
    let certs = parse_certificates(pem, "CA certificate")?;

    let mut roots = RootCertStore::empty();
    for cert in certs {
        roots
            .add(cert)
            .map_err(|e| error::config(format!("invalid CA certificate: {e}")))?;
    }
    Ok(roots)
}

pub(crate) fn parse_cert_chain(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    parse_certificates(pem, "client certificate")
}

pub(crate) fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|e| error::config(format!("unable to parse client key: {e}")))?
        .ok_or_else(|| error::config("no private key found in client key PEM"))
}

fn parse_certificates(pem: &[u8], what: &str) -> Result<Vec<CertificateDer<'static>>> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| error::config(format!("unable to parse {what}: {e}")))?;
    if certs.is_empty() {
        return Err(error::config(format!("no certificates found in {what} PEM")));
    }
    Ok(certs)
}
