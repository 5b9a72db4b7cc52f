//! HTTP CONNECT tunnel establishment
//!
//! Opens a TCP connection to an HTTP proxy, asks it to tunnel to the
//! destination and hands back the socket once the proxy answers `200`.
//! Bytes the proxy sends after its response head are kept as a read prefix.

use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::{Bytes, BytesMut};

use super::basic_connection::{abort, connect_tcp};
use crate::config::DialOptions;
use crate::connect::types::{Connection, DialedConnection, RawStream, Rewind, TunnelRequest};
use crate::error::{self, MalformedResponse, Result, TunnelRejected};
use crate::proxy::ProxyTarget;

/// Largest response head accepted from a proxy.
const MAX_RESPONSE_HEAD: usize = 16 * 1024;
const MAX_HEADERS: usize = 64;
const READ_CHUNK: usize = 4096;

/// Dial `request` through the HTTP proxy at `proxy`.
pub fn dial_tunnel(
    proxy: &ProxyTarget,
    request: &TunnelRequest,
    options: &DialOptions,
) -> Result<DialedConnection> {
    tracing::debug!("CONNECT {} via {}", request, proxy);
    let options = &options.started();
    let stream = connect_tcp(&proxy.addr(), options)?;
    let auth = proxy.basic_auth_header();
    let raw = establish_connect_tunnel(stream, request, auth.as_deref(), options)?;
    Ok(DialedConnection::new(
        Connection::Plain(raw),
        request.authority(),
    ))
}

/// Run the CONNECT exchange on an already connected proxy socket.
///
/// `auth` is the full `Proxy-Authorization` value. The socket is shut down
/// on every failure path.
pub fn establish_connect_tunnel(
    mut stream: TcpStream,
    request: &TunnelRequest,
    auth: Option<&str>,
    options: &DialOptions,
) -> Result<RawStream> {
    let options = &options.started();
    let leftover = match handshake(&mut stream, request, auth, options) {
        Ok(leftover) => leftover,
        Err(e) => {
            abort(&stream);
            return Err(e);
        }
    };

    // The tunnel belongs to the caller now; drop the handshake deadlines.
    let cleared = stream
        .set_read_timeout(None)
        .and_then(|()| stream.set_write_timeout(None));
    if let Err(e) = cleared {
        abort(&stream);
        return Err(error::from_io(e));
    }

    if !leftover.is_empty() {
        tracing::debug!("{} bytes pipelined after CONNECT response", leftover.len());
    }
    Ok(RawStream::Tunneled(Rewind::new_buffered(stream, leftover)))
}

fn handshake(
    stream: &mut TcpStream,
    request: &TunnelRequest,
    auth: Option<&str>,
    options: &DialOptions,
) -> Result<Bytes> {
    stream
        .set_write_timeout(Some(options.budget()?))
        .map_err(error::from_io)?;
    stream
        .write_all(connect_request(request, auth).as_bytes())
        .map_err(error::from_handshake_io)?;

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        stream
            .set_read_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        let n = stream.read(&mut chunk).map_err(error::from_handshake_io)?;
        if n == 0 {
            return Err(error::protocol(MalformedResponse(
                "proxy closed the connection before completing its response".to_string(),
            )));
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head) = parse_head(&buf)? {
            if head.code != 200 {
                return Err(error::protocol(TunnelRejected {
                    destination: request.authority(),
                    status: head.status,
                }));
            }
            return Ok(buf.split_off(head.len).freeze());
        }

        if buf.len() >= MAX_RESPONSE_HEAD {
            return Err(error::protocol(MalformedResponse(format!(
                "response head exceeds {MAX_RESPONSE_HEAD} bytes"
            ))));
        }
    }
}

fn connect_request(request: &TunnelRequest, auth: Option<&str>) -> String {
    let authority = request.authority();
    match auth {
        Some(auth) => format!(
            "CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\nProxy-Authorization: {auth}\r\n\r\n"
        ),
        None => format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n\r\n"),
    }
}

#[derive(Debug)]
struct ResponseHead {
    code: u16,
    /// Status code and reason phrase as sent
    status: String,
    /// Length of the head including the blank line
    len: usize,
}

fn parse_head(buf: &[u8]) -> Result<Option<ResponseHead>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut response = httparse::Response::new(&mut headers);
    match response.parse(buf) {
        Ok(httparse::Status::Complete(len)) => {
            let code = response.code.unwrap_or_default();
            let reason = response.reason.unwrap_or_default();
            let status = format!("{code} {reason}").trim_end().to_string();
            Ok(Some(ResponseHead { code, status, len }))
        }
        Ok(httparse::Status::Partial) => Ok(None),
        Err(e) => Err(error::protocol(MalformedResponse(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_request_without_credentials() {
        let request = TunnelRequest::new("10.0.0.5", 9042);
        assert_eq!(
            connect_request(&request, None),
            "CONNECT 10.0.0.5:9042 HTTP/1.1\r\nHost: 10.0.0.5:9042\r\n\r\n"
        );
    }

    #[test]
    fn test_connect_request_with_credentials() {
        let request = TunnelRequest::new("scylla-server", 9042);
        let line = connect_request(&request, Some("Basic dTpw"));
        assert!(line.contains("\r\nProxy-Authorization: Basic dTpw\r\n"));
        assert!(line.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_partial_head_needs_more_bytes() {
        assert!(parse_head(b"HTTP/1.1 200 Connection established\r\n").unwrap().is_none());
    }

    #[test]
    fn test_head_length_excludes_pipelined_bytes() {
        let buf = b"HTTP/1.1 200 OK\r\nVia: proxy\r\n\r\nhello";
        let head = parse_head(buf).unwrap().unwrap();
        assert_eq!(head.code, 200);
        assert_eq!(&buf[head.len..], b"hello");
    }

    #[test]
    fn test_status_text_is_literal() {
        let head = parse_head(b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(head.status, "407 Proxy Authentication Required");
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_head(b"SSH-2.0-OpenSSH_9.6\r\n\r\n").unwrap_err();
        assert!(err.is_protocol());
    }
}
