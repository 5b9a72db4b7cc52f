//! SOCKS5 protocol implementation
//!
//! Client side of RFC 1928 `CONNECT`, with RFC 1929 username/password
//! sub-negotiation when the proxy URL carries credentials.

use std::io::{self, Read, Write};
use std::net::{IpAddr, TcpStream};
use std::str::FromStr;

use super::basic_connection::{abort, connect_tcp};
use crate::config::DialOptions;
use crate::connect::types::{Connection, DialedConnection, RawStream, TunnelRequest};
use crate::error::{self, Result, SocksRejected};
use crate::proxy::{ProxyAuth, ProxyTarget};

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USER_PASS: u8 = 0x02;
const METHOD_NONE_ACCEPTABLE: u8 = 0xFF;
const USER_PASS_VERSION: u8 = 0x01;
const CMD_CONNECT: u8 = 0x01;

/// Dial `request` through the SOCKS5 proxy at `proxy`.
pub fn dial_socks5(
    proxy: &ProxyTarget,
    request: &TunnelRequest,
    options: &DialOptions,
) -> Result<DialedConnection> {
    tracing::debug!("SOCKS5 CONNECT {} via {}", request, proxy);
    let options = &options.started();
    let mut stream = connect_tcp(&proxy.addr(), options)?;

    let handshake = socks5_handshake(&mut stream, request, proxy.auth.as_ref(), options)
        .and_then(|()| {
            stream
                .set_read_timeout(None)
                .and_then(|()| stream.set_write_timeout(None))
                .map_err(error::from_io)
        });
    if let Err(e) = handshake {
        abort(&stream);
        return Err(e);
    }

    Ok(DialedConnection::new(
        Connection::Plain(RawStream::Tcp(stream)),
        request.authority(),
    ))
}

/// SOCKS5 handshake on a connected proxy socket.
pub fn socks5_handshake(
    stream: &mut TcpStream,
    request: &TunnelRequest,
    auth: Option<&ProxyAuth>,
    options: &DialOptions,
) -> Result<()> {
    let options = &options.started();

    // Method negotiation
    let greeting: &[u8] = if auth.is_some() {
        &[SOCKS_VERSION, 0x02, METHOD_NO_AUTH, METHOD_USER_PASS]
    } else {
        &[SOCKS_VERSION, 0x01, METHOD_NO_AUTH]
    };
    write_step(stream, greeting, options)?;

    let mut method = [0u8; 2];
    read_step(stream, &mut method, options)?;
    check_version(method[0])?;

    match method[1] {
        METHOD_NO_AUTH => {}
        METHOD_USER_PASS => match auth {
            Some(auth) => authenticate(stream, auth, options)?,
            None => {
                return Err(error::protocol(
                    "socks5 proxy selected username/password auth that was not offered",
                ));
            }
        },
        METHOD_NONE_ACCEPTABLE => {
            return Err(error::connect("socks5 proxy accepted none of the offered auth methods"));
        }
        other => {
            return Err(error::protocol(format!(
                "socks5 proxy selected unsupported auth method {other:#04x}"
            )));
        }
    }

    // Connection request
    let mut packet = vec![SOCKS_VERSION, CMD_CONNECT, 0x00];
    if let Ok(ip) = IpAddr::from_str(&request.host) {
        match ip {
            IpAddr::V4(ipv4) => {
                packet.push(0x01);
                packet.extend_from_slice(&ipv4.octets());
            }
            IpAddr::V6(ipv6) => {
                packet.push(0x04);
                packet.extend_from_slice(&ipv6.octets());
            }
        }
    } else {
        let len = u8::try_from(request.host.len()).map_err(|_| {
            error::config(format!("destination host {} is too long for socks5", request.host))
        })?;
        packet.push(0x03);
        packet.push(len);
        packet.extend_from_slice(request.host.as_bytes());
    }
    packet.extend_from_slice(&request.port.to_be_bytes());
    write_step(stream, &packet, options)?;

    let mut reply = [0u8; 4];
    read_step(stream, &mut reply, options)?;
    check_version(reply[0])?;

    if reply[1] != 0x00 {
        return Err(error::connect(SocksRejected {
            destination: request.authority(),
            code: reply[1],
            reason: reply_reason(reply[1]),
        }));
    }

    // Skip bound address (variable length)
    let remaining = match reply[3] {
        0x01 => 4 + 2,
        0x04 => 16 + 2,
        0x03 => {
            let mut len = [0u8; 1];
            read_step(stream, &mut len, options)?;
            usize::from(len[0]) + 2
        }
        other => {
            return Err(error::protocol(format!(
                "socks5 reply carries unknown address type {other:#04x}"
            )));
        }
    };
    let mut bound = vec![0u8; remaining];
    read_step(stream, &mut bound, options)?;

    Ok(())
}

fn authenticate(stream: &mut TcpStream, auth: &ProxyAuth, options: &DialOptions) -> Result<()> {
    let username = u8::try_from(auth.username.len())
        .map_err(|_| error::config("socks5 username exceeds 255 bytes"))?;
    let password = u8::try_from(auth.password.len())
        .map_err(|_| error::config("socks5 password exceeds 255 bytes"))?;

    let mut packet = Vec::with_capacity(3 + auth.username.len() + auth.password.len());
    packet.push(USER_PASS_VERSION);
    packet.push(username);
    packet.extend_from_slice(auth.username.as_bytes());
    packet.push(password);
    packet.extend_from_slice(auth.password.as_bytes());
    write_step(stream, &packet, options)?;

    let mut status = [0u8; 2];
    read_step(stream, &mut status, options)?;
    if status[1] != 0x00 {
        return Err(error::connect(format!(
            "socks5 proxy rejected credentials for user {}",
            auth.username
        )));
    }
    Ok(())
}

fn write_step(stream: &mut TcpStream, bytes: &[u8], options: &DialOptions) -> Result<()> {
    stream
        .set_write_timeout(Some(options.budget()?))
        .map_err(error::from_io)?;
    stream.write_all(bytes).map_err(error::from_handshake_io)
}

/// `read_exact` where every underlying read is bounded by what is left of
/// the dial budget.
fn read_step(stream: &mut TcpStream, buf: &mut [u8], options: &DialOptions) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        stream
            .set_read_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(error::from_handshake_io(io::ErrorKind::UnexpectedEof.into()));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(error::from_handshake_io(e)),
        }
    }
    Ok(())
}

fn check_version(version: u8) -> Result<()> {
    if version == SOCKS_VERSION {
        Ok(())
    } else {
        Err(error::protocol(format!(
            "expected socks version 5, proxy answered with {version:#04x}"
        )))
    }
}

/// RFC 1928 §6 reply field.
fn reply_reason(code: u8) -> &'static str {
    match code {
        0x01 => "general SOCKS server failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unassigned reply code",
    }
}
