//! Mock proxy and CQL-node TLS peer for the cluster tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};

pub const CA_PEM: &str = include_str!("../../../client/tests/fixtures/ca.pem");
pub const SERVER_PEM: &[u8] = include_bytes!("../../../client/tests/fixtures/server.pem");
pub const SERVER_KEY: &[u8] = include_bytes!("../../../client/tests/fixtures/server.key");

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn spawn_listener<F>(connections: usize, handler: F) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn(usize, TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock listener");
    let addr = listener.local_addr().expect("mock listener address");
    let handle = thread::spawn(move || {
        for index in 0..connections {
            let (stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .expect("set read timeout");
            handler(index, stream);
        }
    });
    (addr, handle)
}

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

pub fn server_config() -> Arc<ServerConfig> {
    let certs = rustls_pemfile::certs(&mut &SERVER_PEM[..])
        .collect::<Result<Vec<CertificateDer<'static>>, _>>()
        .expect("server certificate");
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut &SERVER_KEY[..])
        .expect("server key")
        .expect("server key present");
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Arc::new(
        ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("protocol versions")
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .expect("server config"),
    )
}

/// Complete TLS as the node and answer one `PING` with `PONG`.
pub fn serve_tls_ping(stream: TcpStream) {
    let conn = ServerConnection::new(server_config()).expect("server connection");
    let mut tls = StreamOwned::new(conn, stream);
    let mut ping = [0u8; 4];
    tls.read_exact(&mut ping).expect("read ping");
    assert_eq!(&ping, b"PING");
    tls.write_all(b"PONG").expect("write pong");
    tls.flush().expect("flush pong");
}

pub fn ping<S: Read + Write>(conn: &mut S) {
    conn.write_all(b"PING").expect("write ping");
    let mut pong = [0u8; 4];
    conn.read_exact(&mut pong).expect("read pong");
    assert_eq!(&pong, b"PONG");
}
