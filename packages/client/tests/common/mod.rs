//! Loopback mock proxies and TLS fixtures shared by the integration tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};

pub const CA_PEM: &[u8] = include_bytes!("../fixtures/ca.pem");
pub const SERVER_PEM: &[u8] = include_bytes!("../fixtures/server.pem");
pub const SERVER_KEY: &[u8] = include_bytes!("../fixtures/server.key");
pub const CLIENT_PEM: &[u8] = include_bytes!("../fixtures/client.pem");
pub const CLIENT_KEY: &[u8] = include_bytes!("../fixtures/client.key");
pub const OTHER_KEY: &[u8] = include_bytes!("../fixtures/other.key");
pub const ROGUE_PEM: &[u8] = include_bytes!("../fixtures/rogue.pem");
pub const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue.key");

/// Route the client's tracing output through `env_logger`; honours `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Serve `connections` accepted sockets on a loopback listener, one after
/// another, handing each to `handler` with its index.
pub fn spawn_proxy<F>(connections: usize, handler: F) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn(usize, TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock proxy");
    let addr = listener.local_addr().expect("mock proxy address");
    let handle = thread::spawn(move || {
        for index in 0..connections {
            let (stream, _) = listener.accept().expect("accept on mock proxy");
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .expect("set mock proxy read timeout");
            handler(index, stream);
        }
    });
    (addr, handle)
}

/// Read an HTTP request head, byte by byte so nothing past it is consumed.
pub fn read_request_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).expect("read request head");
        assert!(n > 0, "client closed before finishing its request");
        head.push(byte[0]);
    }
    String::from_utf8(head).expect("request head is UTF-8")
}

/// Wait for the peer to close its side. Returns true on a clean EOF.
pub fn peer_closed(stream: &mut TcpStream) -> bool {
    let mut buf = [0u8; 16];
    matches!(stream.read(&mut buf), Ok(0))
}

/// Swallow whatever the peer sends, without answering, until it hangs up.
pub fn drain_until_closed(stream: &mut TcpStream) {
    let mut buf = [0u8; 512];
    while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
}

/// Server half of the SOCKS5 greeting and request. Returns the requested
/// destination as `host:port`, or `None` when the client's credentials were
/// refused. The caller sends the reply.
pub fn socks5_accept(stream: &mut TcpStream, credentials: Option<(&str, &str)>) -> Option<String> {
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).expect("socks greeting");
    assert_eq!(header[0], 0x05, "client must speak socks5");
    let mut methods = vec![0u8; usize::from(header[1])];
    stream.read_exact(&mut methods).expect("socks methods");

    match credentials {
        Some((username, password)) => {
            assert!(methods.contains(&0x02), "client did not offer username/password");
            stream.write_all(&[0x05, 0x02]).expect("select user/pass");

            let mut version = [0u8; 2];
            stream.read_exact(&mut version).expect("auth version and ulen");
            assert_eq!(version[0], 0x01);
            let mut user = vec![0u8; usize::from(version[1])];
            stream.read_exact(&mut user).expect("username");
            let mut plen = [0u8; 1];
            stream.read_exact(&mut plen).expect("password length");
            let mut pass = vec![0u8; usize::from(plen[0])];
            stream.read_exact(&mut pass).expect("password");

            let ok = user == username.as_bytes() && pass == password.as_bytes();
            stream
                .write_all(&[0x01, if ok { 0x00 } else { 0x01 }])
                .expect("auth status");
            if !ok {
                return None;
            }
        }
        None => {
            assert!(methods.contains(&0x00), "client did not offer no-auth");
            stream.write_all(&[0x05, 0x00]).expect("select no auth");
        }
    }

    let mut request = [0u8; 4];
    stream.read_exact(&mut request).expect("socks request");
    assert_eq!([request[0], request[1]], [0x05, 0x01], "expected CONNECT");
    let host = match request[3] {
        0x01 => {
            let mut ip = [0u8; 4];
            stream.read_exact(&mut ip).expect("ipv4 destination");
            Ipv4Addr::from(ip).to_string()
        }
        0x04 => {
            let mut ip = [0u8; 16];
            stream.read_exact(&mut ip).expect("ipv6 destination");
            format!("[{}]", Ipv6Addr::from(ip))
        }
        0x03 => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).expect("domain length");
            let mut name = vec![0u8; usize::from(len[0])];
            stream.read_exact(&mut name).expect("domain");
            String::from_utf8(name).expect("domain is UTF-8")
        }
        other => panic!("unexpected address type {other}"),
    };
    let mut port = [0u8; 2];
    stream.read_exact(&mut port).expect("destination port");
    Some(format!("{host}:{}", u16::from_be_bytes(port)))
}

pub fn socks5_reply(stream: &mut TcpStream, code: u8) {
    stream
        .write_all(&[0x05, code, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .expect("socks reply");
}

fn certs(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .expect("fixture certificates")
}

fn key(pem: &[u8]) -> PrivateKeyDer<'static> {
    rustls_pemfile::private_key(&mut &pem[..])
        .expect("fixture key")
        .expect("fixture key present")
}

/// Server config presenting `cert`/`key`; requires a CA-signed client
/// certificate when `require_client_cert` is set.
pub fn server_config(cert: &[u8], key_pem: &[u8], require_client_cert: bool) -> Arc<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .expect("protocol versions");
    let builder = if require_client_cert {
        let mut roots = RootCertStore::empty();
        for ca in certs(CA_PEM) {
            roots.add(ca).expect("add CA");
        }
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .expect("client verifier");
        builder.with_client_cert_verifier(verifier)
    } else {
        builder.with_no_client_auth()
    };
    Arc::new(
        builder
            .with_single_cert(certs(cert), key(key_pem))
            .expect("server certificate"),
    )
}

/// Act as the CQL node on an accepted tunnel: complete TLS, answer one
/// `PING` with `PONG`. Returns the client certificate chain length seen.
pub fn serve_tls_ping(stream: TcpStream, config: Arc<ServerConfig>) -> usize {
    let conn = ServerConnection::new(config).expect("server connection");
    let mut tls = StreamOwned::new(conn, stream);
    let mut ping = [0u8; 4];
    tls.read_exact(&mut ping).expect("read ping over TLS");
    assert_eq!(&ping, b"PING");
    tls.write_all(b"PONG").expect("write pong over TLS");
    tls.flush().expect("flush pong");
    tls.conn.peer_certificates().map_or(0, |chain| chain.len())
}

/// Drive a TLS server handshake that is expected to fail on the client side.
pub fn serve_tls_until_close(stream: TcpStream, config: Arc<ServerConfig>) {
    let conn = ServerConnection::new(config).expect("server connection");
    let mut tls = StreamOwned::new(conn, stream);
    let mut buf = [0u8; 16];
    let _ = tls.read(&mut buf);
}

/// Answer `queries` length-prefixed DNS queries on `stream`. `answer` maps
/// each query's record type to a response code and addresses.
pub fn serve_dns<S, F>(stream: &mut S, queries: usize, answer: F) -> Vec<String>
where
    S: Read + Write,
    F: Fn(hickory_proto::rr::RecordType) -> (hickory_proto::op::ResponseCode, Vec<std::net::IpAddr>),
{
    use hickory_proto::op::{Message, MessageType};
    use hickory_proto::rr::rdata::{A, AAAA};
    use hickory_proto::rr::{RData, Record};
    use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};

    let mut asked = Vec::new();
    for _ in 0..queries {
        let mut len = [0u8; 2];
        stream.read_exact(&mut len).expect("dns length prefix");
        let mut query = vec![0u8; usize::from(u16::from_be_bytes(len))];
        stream.read_exact(&mut query).expect("dns query");
        let request = Message::from_bytes(&query).expect("decode dns query");
        let question = request.queries()[0].clone();
        asked.push(format!("{} {}", question.name(), question.query_type()));

        let (code, ips) = answer(question.query_type());
        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_response_code(code)
            .add_query(question.clone());
        for ip in ips {
            let rdata = match ip {
                std::net::IpAddr::V4(v4) => RData::A(A(v4)),
                std::net::IpAddr::V6(v6) => RData::AAAA(AAAA(v6)),
            };
            response.add_answer(Record::from_rdata(question.name().clone(), 60, rdata));
        }
        let bytes = response.to_bytes().expect("encode dns response");
        let len = u16::try_from(bytes.len()).expect("dns response fits");
        stream.write_all(&len.to_be_bytes()).expect("write length prefix");
        stream.write_all(&bytes).expect("write dns response");
    }
    asked
}
