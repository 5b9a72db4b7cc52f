//! Stream types handed back by the dialers

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use rustls::{ClientConnection, StreamOwned};

use super::rewind::Rewind;

/// Unencrypted transport: a direct socket, or a tunneled socket that may
/// still hold bytes the proxy pipelined after its acknowledgement.
#[derive(Debug)]
pub enum RawStream {
    Tcp(TcpStream),
    Tunneled(Rewind<TcpStream>),
}

impl RawStream {
    pub fn tcp(&self) -> &TcpStream {
        match self {
            RawStream::Tcp(stream) => stream,
            RawStream::Tunneled(stream) => stream.get_ref(),
        }
    }

    /// Bytes buffered ahead of the socket.
    pub fn buffered(&self) -> usize {
        match self {
            RawStream::Tcp(_) => 0,
            RawStream::Tunneled(stream) => stream.buffered(),
        }
    }

    pub(crate) fn set_io_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        let tcp = self.tcp();
        tcp.set_read_timeout(timeout)?;
        tcp.set_write_timeout(timeout)
    }
}

impl Read for RawStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            RawStream::Tcp(stream) => stream.read(buf),
            RawStream::Tunneled(stream) => stream.read(buf),
        }
    }
}

impl Write for RawStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            RawStream::Tcp(stream) => stream.write(buf),
            RawStream::Tunneled(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            RawStream::Tcp(stream) => stream.flush(),
            RawStream::Tunneled(stream) => stream.flush(),
        }
    }
}

/// A dialed transport, plain or TLS-wrapped. TLS is applied at most once.
pub enum Connection {
    Plain(RawStream),
    Tls(Box<StreamOwned<ClientConnection, RawStream>>),
}

impl Connection {
    pub fn is_tls(&self) -> bool {
        matches!(self, Connection::Tls(_))
    }

    pub fn raw(&self) -> &RawStream {
        match self {
            Connection::Plain(raw) => raw,
            Connection::Tls(tls) => tls.get_ref(),
        }
    }

    pub fn tcp(&self) -> &TcpStream {
        self.raw().tcp()
    }

    /// The rustls session, once the connection has been upgraded.
    pub fn tls_session(&self) -> Option<&ClientConnection> {
        match self {
            Connection::Plain(_) => None,
            Connection::Tls(tls) => Some(&tls.conn),
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.tcp().peer_addr()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp().local_addr()
    }

    pub fn set_io_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.raw().set_io_timeout(timeout)
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.tcp().shutdown(Shutdown::Both)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Plain(raw) => f.debug_tuple("Plain").field(raw).finish(),
            Connection::Tls(tls) => f
                .debug_struct("Tls")
                .field("stream", tls.get_ref())
                .field("protocol", &tls.conn.protocol_version())
                .finish(),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(raw) => raw.read(buf),
            Connection::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(raw) => raw.write(buf),
            Connection::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(raw) => raw.flush(),
            Connection::Tls(tls) => tls.flush(),
        }
    }
}

/// An open stream paired with the `host:port` that produced it.
///
/// Returned only after the destination is confirmed reachable: the proxy has
/// acknowledged the tunnel (or the direct connect succeeded) and, when TLS is
/// configured, the handshake has completed.
#[derive(Debug)]
pub struct DialedConnection {
    conn: Connection,
    address: String,
}

impl DialedConnection {
    pub(crate) fn new(conn: Connection, address: impl Into<String>) -> Self {
        Self {
            conn,
            address: address.into(),
        }
    }

    /// The candidate address that succeeded.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_tls(&self) -> bool {
        self.conn.is_tls()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    pub(crate) fn into_parts(self) -> (Connection, String) {
        (self.conn, self.address)
    }

    /// Address of the socket's peer. For tunneled streams this is the proxy.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.conn.peer_addr()
    }

    pub fn set_io_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.conn.set_io_timeout(timeout)
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.conn.shutdown()
    }
}

impl Read for DialedConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.conn.read(buf)
    }
}

impl Write for DialedConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.conn.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.conn.flush()
    }
}
