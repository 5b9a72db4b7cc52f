//! Read prefix replay for tunneled streams
//!
//! A proxy may pipeline the first bytes of the tunneled protocol right after
//! its `200` acknowledgement. Those bytes land in the header buffer; this
//! wrapper hands them out before reading from the socket again.

use std::cmp;
use std::io::{self, Read, Write};

use bytes::{Buf, Bytes};

/// Stream that replays a buffered prefix before reading from `inner`.
#[derive(Debug)]
pub struct Rewind<T> {
    pre: Option<Bytes>,
    inner: T,
}

impl<T> Rewind<T> {
    pub fn new(io: T) -> Self {
        Rewind {
            pre: None,
            inner: io,
        }
    }

    pub fn new_buffered(io: T, buf: Bytes) -> Self {
        Rewind {
            pre: (!buf.is_empty()).then_some(buf),
            inner: io,
        }
    }

    /// Bytes still waiting to be replayed.
    pub fn buffered(&self) -> usize {
        self.pre.as_ref().map_or(0, Bytes::len)
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> (T, Bytes) {
        (self.inner, self.pre.unwrap_or_default())
    }
}

impl<T: Read> Read for Rewind<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(mut prefix) = self.pre.take()
            && !prefix.is_empty()
        {
            let n = cmp::min(prefix.len(), buf.len());
            buf[..n].copy_from_slice(&prefix[..n]);
            prefix.advance(n);
            if !prefix.is_empty() {
                self.pre = Some(prefix);
            }
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

impl<T: Write> Write for Rewind<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
