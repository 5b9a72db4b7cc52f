//! Builds the rustls client configuration from operator-supplied PEM

use std::sync::Arc;

use rustls::ClientConfig;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::ring;

use super::client_auth::FixedClientCert;
use super::pem::{parse_cert_chain, parse_private_key, parse_trust_roots};
use super::types::{TlsConfig, TlsMaterial};
use super::verifier::NameAgnosticVerifier;
use crate::error::{self, Result};

/// Build the client configuration shared by every TLS upgrade.
///
/// The CA must parse into at least one trust root. A client certificate and
/// key enable mutual TLS and must be supplied together. With host
/// verification off, the chain is still checked against the CA.
pub fn build_tls_config(material: &TlsMaterial) -> Result<TlsConfig> {
    let provider = Arc::new(ring::default_provider());
    let roots = Arc::new(parse_trust_roots(&material.ca_certificate)?);

    let webpki = WebPkiServerVerifier::builder_with_provider(roots, Arc::clone(&provider))
        .build()
        .map_err(|e| error::config(format!("unable to build certificate verifier: {e}")))?;

    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(error::tls)?;
    let builder = if material.host_verification() {
        builder.with_webpki_verifier(webpki)
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NameAgnosticVerifier::new(webpki)))
    };

    let (client_config, mutual) = match (&material.client_certificate, &material.client_key) {
        (Some(cert), Some(key)) => {
            let chain = parse_cert_chain(cert)?;
            let key = parse_private_key(key)?;
            let resolver = FixedClientCert::new(chain, key, &provider)?;
            (builder.with_client_cert_resolver(Arc::new(resolver)), true)
        }
        (None, None) => (builder.with_no_client_auth(), false),
        (Some(_), None) => return Err(error::config("client certificate given without a client key")),
        (None, Some(_)) => return Err(error::config("client key given without a client certificate")),
    };

    tracing::debug!(
        "built TLS config (host verification: {}, mutual: {})",
        material.host_verification(),
        mutual
    );
    Ok(TlsConfig::new(
        Arc::new(client_config),
        material.skips_host_verification(),
        mutual,
    ))
}

/// [`build_tls_config`] from individual PEM inputs.
pub fn tls_config_from_pem(
    ca_certificate: &[u8],
    client_certificate: Option<&[u8]>,
    client_key: Option<&[u8]>,
    skip_host_verification: bool,
) -> Result<TlsConfig> {
    let mut material =
        TlsMaterial::new(ca_certificate).with_skip_host_verification(skip_host_verification);
    material.client_certificate = client_certificate.filter(|pem| !pem.is_empty()).map(<[u8]>::to_vec);
    material.client_key = client_key.filter(|pem| !pem.is_empty()).map(<[u8]>::to_vec);
    build_tls_config(&material)
}
