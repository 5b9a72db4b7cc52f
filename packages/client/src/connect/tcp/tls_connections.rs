//! TLS upgrade of dialed connections
//!
//! The handshake completes before the connection is handed back, so a
//! certificate problem surfaces as a dial error rather than on first use.

use std::io::{self, Write};

use rustls::pki_types::ServerName;
use rustls::{ClientConnection, StreamOwned};

use crate::config::DialOptions;
use crate::connect::types::{Connection, DialedConnection, RawStream, TunnelRequest};
use crate::error::{self, AlreadyEncrypted, Error, Result};
use crate::tls::TlsConfig;

/// Wrap `conn` in TLS, verifying the server as `host`.
pub fn establish_rustls_connection(
    conn: Connection,
    host: &str,
    tls: &TlsConfig,
    options: &DialOptions,
) -> Result<Connection> {
    let options = &options.started();
    let mut raw = match conn {
        Connection::Plain(raw) => raw,
        Connection::Tls(tls_stream) => {
            let _ = tls_stream.get_ref().tcp().shutdown(std::net::Shutdown::Both);
            return Err(error::config(AlreadyEncrypted(host.to_string())));
        }
    };

    let result = handshake(&mut raw, host, tls, options);

    match result {
        Ok(session) => {
            tracing::debug!(
                "TLS established with {} ({:?})",
                host,
                session.protocol_version()
            );
            Ok(Connection::Tls(Box::new(StreamOwned::new(session, raw))))
        }
        Err(e) => {
            let _ = raw.tcp().shutdown(std::net::Shutdown::Both);
            Err(e)
        }
    }
}

/// Upgrade a dialed connection, using the host part of its winning address
/// as the server name.
pub fn upgrade_dialed(
    dialed: DialedConnection,
    tls: &TlsConfig,
    options: &DialOptions,
) -> Result<DialedConnection> {
    let options = &options.started();
    let (conn, address) = dialed.into_parts();
    let host = match TunnelRequest::parse(&address) {
        Ok(request) => request.host,
        Err(e) => {
            let _ = conn.shutdown();
            return Err(e);
        }
    };
    let conn = establish_rustls_connection(conn, &host, tls, options)?;
    Ok(DialedConnection::new(conn, address))
}

fn handshake(
    raw: &mut RawStream,
    host: &str,
    tls: &TlsConfig,
    options: &DialOptions,
) -> Result<ClientConnection> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| error::config(format!("invalid TLS server name {host}: {e}")))?;
    let mut session = ClientConnection::new(tls.client_config(), server_name).map_err(error::tls)?;

    // Driven by hand: `complete_io` retries reads that fail with
    // `WouldBlock`, which is how a socket read timeout surfaces on unix.
    while session.is_handshaking() {
        raw.set_io_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        if session.wants_write() {
            session.write_tls(raw).map_err(handshake_error)?;
            raw.flush().map_err(handshake_error)?;
        } else if session.wants_read() {
            if session.read_tls(raw).map_err(handshake_error)? == 0 {
                return Err(error::tls(format!(
                    "{host} closed the connection during the TLS handshake"
                )));
            }
            if let Err(e) = session.process_new_packets() {
                // Best effort: let the server see the alert.
                let _ = session.write_tls(raw);
                return Err(error::tls(e));
            }
        } else {
            return Err(error::tls("TLS handshake stalled"));
        }
    }
    // The client Finished may still be queued.
    while session.wants_write() {
        raw.set_io_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        session.write_tls(raw).map_err(handshake_error)?;
    }
    raw.flush().map_err(handshake_error)?;
    raw.set_io_timeout(None).map_err(error::from_io)?;
    Ok(session)
}

fn handshake_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => error::from_io(e),
        _ => error::tls(e),
    }
}
