//! DNS over TCP through the configured proxy
//!
//! Each lookup opens one tunnel to `{nameserver}:53` and asks for A and
//! AAAA records over it, using the RFC 1035 §4.2.2 two-byte length framing.

use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};

use super::Resolve;
use crate::config::DialOptions;
use crate::connect::{DialedConnection, ProxyDialer};
use crate::error::{self, Error, MalformedResponse, NoSuchHost, Result};

pub const DNS_PORT: u16 = 53;

/// Resolver that sends its queries through a proxy tunnel.
#[derive(Debug, Clone)]
pub struct ProxyDnsResolver {
    nameserver: SocketAddr,
    dialer: ProxyDialer,
}

impl ProxyDnsResolver {
    /// `nameserver` must be an IP address; port 53 is implied.
    pub fn new(dialer: ProxyDialer, nameserver: &str) -> Result<Self> {
        let ip: IpAddr = nameserver.trim().parse().map_err(|e| {
            error::config(format!("DNS nameserver {nameserver:?} is not an IP address: {e}"))
        })?;
        Ok(Self::with_address(dialer, SocketAddr::new(ip, DNS_PORT)))
    }

    /// Use a nameserver on a non-standard port.
    pub fn with_address(dialer: ProxyDialer, nameserver: SocketAddr) -> Self {
        Self { nameserver, dialer }
    }

    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }

    fn exchange(
        &self,
        conn: &mut DialedConnection,
        host: &str,
        record_type: RecordType,
        options: &DialOptions,
    ) -> Result<Vec<IpAddr>> {
        let id = fastrand::u16(..);
        let query = encode_query(id, host, record_type)?;
        let len = u16::try_from(query.len())
            .map_err(|_| error::config(format!("DNS query for {host} is too large")))?;

        let mut frame = Vec::with_capacity(query.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&query);
        conn.set_io_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        conn.write_all(&frame).map_err(error::from_io)?;
        conn.flush().map_err(error::from_io)?;

        let mut len = [0u8; 2];
        read_frame(conn, &mut len, options)?;
        let mut response = vec![0u8; usize::from(u16::from_be_bytes(len))];
        read_frame(conn, &mut response, options)?;

        decode_answers(id, host, &response)
    }

    /// A then AAAA over one tunnel.
    ///
    /// A failure answer to one record type does not discard what the other
    /// returned; NXDOMAIN and transport errors end the lookup at once.
    fn query_addresses(
        &self,
        conn: &mut DialedConnection,
        host: &str,
        options: &DialOptions,
    ) -> Result<Vec<IpAddr>> {
        let mut ips = Vec::new();
        let mut failed = None;
        for record_type in [RecordType::A, RecordType::AAAA] {
            match self.exchange(conn, host, record_type, options) {
                Ok(found) => ips.extend(found),
                Err(e) if e.is_resolve() && !is_no_such_host(&e) => {
                    tracing::debug!("{} lookup for {} failed: {}", record_type, host, e);
                    failed.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        match failed {
            Some(e) if ips.is_empty() => Err(e),
            _ => Ok(ips),
        }
    }
}

/// `read_exact` with every read bounded by what is left of the budget.
fn read_frame(conn: &mut DialedConnection, buf: &mut [u8], options: &DialOptions) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        conn.set_io_timeout(Some(options.budget()?))
            .map_err(error::from_io)?;
        match conn.read(&mut buf[filled..]) {
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

fn is_no_such_host(e: &Error) -> bool {
    e.get_ref().is_some_and(|source| source.is::<NoSuchHost>())
}

impl Resolve for ProxyDnsResolver {
    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        tracing::debug!("resolving {} via {} through {}", host, self.nameserver, self.dialer.target());
        let options = self.dialer.options().started();
        let mut conn = self
            .dialer
            .clone()
            .with_options(options)
            .dial_addr(&self.nameserver.to_string())?;
        let result = self.query_addresses(&mut conn, host, &options);
        let _ = conn.shutdown();

        let addrs: Vec<SocketAddr> = result?
            .into_iter()
            .map(|ip| SocketAddr::new(ip, port))
            .collect();
        if addrs.is_empty() {
            return Err(error::resolve(format!("no addresses found for {host}")));
        }
        Ok(addrs)
    }
}

/// Build a [`ProxyDnsResolver`] and install it process-wide.
///
/// The handle is returned so callers can also pass it to dialers directly.
pub fn install_proxy_dns(dialer: ProxyDialer, nameserver: &str) -> Result<Arc<ProxyDnsResolver>> {
    let resolver = Arc::new(ProxyDnsResolver::new(dialer, nameserver)?);
    super::install(resolver.clone());
    Ok(resolver)
}

pub(crate) fn encode_query(id: u16, host: &str, record_type: RecordType) -> Result<Vec<u8>> {
    let fqdn = if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    };
    let name = Name::from_ascii(&fqdn)
        .map_err(|e| error::config(format!("invalid host name {host:?}: {e}")))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, record_type));
    message.to_bytes().map_err(error::resolve)
}

pub(crate) fn decode_answers(id: u16, host: &str, bytes: &[u8]) -> Result<Vec<IpAddr>> {
    let message = Message::from_bytes(bytes)
        .map_err(|e| error::protocol(MalformedResponse(format!("DNS response: {e}"))))?;
    if message.id() != id {
        return Err(error::protocol(MalformedResponse(format!(
            "DNS response id {} does not match query id {id}",
            message.id()
        ))));
    }

    match message.response_code() {
        ResponseCode::NoError => {}
        ResponseCode::NXDomain => {
            return Err(error::resolve(NoSuchHost(host.to_string())));
        }
        code => {
            return Err(error::resolve(format!("lookup of {host} failed: {code:?}")));
        }
    }

    Ok(message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect())
}
