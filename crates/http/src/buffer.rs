//! Growable byte buffer used for all socket I/O.
//!
//! [`Buffer`] decouples the cadence of socket reads from the cadence of parsing: partial reads
//! accumulate in the buffer until enough bytes exist for the next parse step. [`Buffer::peek`]
//! and [`Buffer::drain`] give a parser lookahead without consuming, then let it commit exactly
//! the bytes it recognized.
//!
//! The buffer is a sliding window over a [`BytesMut`]: unread bytes are always contiguous,
//! consumed bytes at the front are reclaimed when a write needs room, and the backing store
//! at least doubles whenever it has to grow. It never shrinks on its own.
//!
//! # Example
//!
//! ```
//! use micro_http_core::buffer::Buffer;
//!
//! let mut buf = Buffer::new(8);
//! buf.write(b"GET / HTTP/1.1\r\n");
//!
//! let mut method = [0u8; 4];
//! assert_eq!(buf.peek(&mut method), 4);
//! assert_eq!(&method, b"GET ");
//! assert_eq!(buf.drain(4), 4);
//! assert_eq!(buf.size(), 12);
//! ```

use std::cmp;
use std::io;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the bytes [`Buffer::read_from`] asks a reader for in one call.
pub const MAX_READ_CHUNK: usize = 64 * 1024;

/// A growable FIFO byte store with write/read/peek/drain operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    inner: BytesMut,
}

impl Buffer {
    /// Creates a buffer able to hold at least `capacity` bytes before growing.
    ///
    /// A capacity of 0 allocates nothing; the first write allocates.
    pub fn new(capacity: usize) -> Self {
        Self { inner: BytesMut::with_capacity(capacity) }
    }

    /// Number of unread bytes held by the buffer.
    #[inline]
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Alias of [`Buffer::size`].
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Bytes that can be held without growing the backing store.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Appends all of `data`, growing the backing store if needed.
    ///
    /// Always returns `data.len()`. Growth may move the backing storage, so any view obtained
    /// through [`Buffer::as_slice`] must not be held across a write.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }

        self.inner.extend_from_slice(data);
        data.len()
    }

    /// Copies up to `dest.len()` bytes out of the buffer and consumes them.
    ///
    /// Returns the number of bytes copied, which is smaller than `dest.len()` when the buffer
    /// holds fewer bytes.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let len = self.peek(dest);
        self.inner.advance(len);
        len
    }

    /// Same as [`Buffer::read`] but leaves the bytes in the buffer.
    pub fn peek(&self, dest: &mut [u8]) -> usize {
        let len = cmp::min(dest.len(), self.inner.len());
        dest[..len].copy_from_slice(&self.inner[..len]);
        len
    }

    /// Discards up to `len` bytes from the front without copying them.
    pub fn drain(&mut self, len: usize) -> usize {
        let len = cmp::min(len, self.inner.len());
        self.inner.advance(len);
        len
    }

    /// Consumes up to `len` bytes from the front as a shared [`Bytes`] handle.
    pub fn split_to(&mut self, len: usize) -> Bytes {
        let len = cmp::min(len, self.inner.len());
        self.inner.split_to(len).freeze()
    }

    /// Zero-copy view of the unread bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[..]
    }

    /// Drops every unread byte, keeping the allocation.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Makes room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.inner.reserve(additional);
    }

    /// Releases spare capacity, keeping only what the unread bytes need.
    pub fn shrink_to_fit(&mut self) {
        if self.inner.capacity() > self.inner.len() {
            self.inner = BytesMut::from(&self.inner[..]);
        }
    }

    /// Appends at most `max` bytes obtained from a single `read` call on `reader`.
    ///
    /// A single call reads no more than [`MAX_READ_CHUNK`] bytes, so `usize::MAX` asks for as
    /// much as one read can deliver. Returns `Ok(0)` when the reader reached end of stream.
    /// Errors such as [`io::ErrorKind::WouldBlock`] are returned untouched and leave the buffer
    /// unchanged.
    pub fn read_from<R: io::Read>(&mut self, reader: &mut R, max: usize) -> io::Result<usize> {
        let max = cmp::min(max, MAX_READ_CHUNK);
        if max == 0 {
            return Ok(0);
        }

        let start = self.inner.len();
        self.inner.reserve(max);
        self.inner.resize(start + max, 0);
        match reader.read(&mut self.inner[start..]) {
            Ok(n) => {
                self.inner.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                self.inner.truncate(start);
                Err(e)
            }
        }
    }

    /// Hands the unread bytes to a single `write` call on `writer`, consuming what it accepted.
    pub fn write_to<W: io::Write>(&mut self, writer: &mut W) -> io::Result<usize> {
        if self.inner.is_empty() {
            return Ok(0);
        }

        let written = writer.write(&self.inner)?;
        self.inner.advance(written);
        Ok(written)
    }

    /// Reads once from an async reader into the buffer, growing it if it is full.
    pub async fn fill_from<R>(&mut self, reader: &mut R) -> io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        reader.read_buf(&mut self.inner).await
    }

    /// Writes every unread byte to an async writer and flushes it.
    pub async fn flush_to<W>(&mut self, writer: &mut W) -> io::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let len = self.inner.len();
        writer.write_all_buf(&mut self.inner).await?;
        writer.flush().await?;
        Ok(len)
    }
}

impl AsRef<[u8]> for Buffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        Self { inner: BytesMut::from(data) }
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Buffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Buffer::read(self, buf))
    }
}

impl Buf for Buffer {
    #[inline]
    fn remaining(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.inner
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        self.inner.advance(cnt);
    }
}
