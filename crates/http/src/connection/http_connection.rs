use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::pipeline::{MessageId, Pipeline};
use crate::protocol::HttpMessage;

/// Initial capacity of both connection buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// State of one HTTP connection
///
/// `HttpConnection` ties together:
/// - the read half, drained into a read [`Buffer`] by [`HttpConnection::fill`]
/// - the write half, fed from a write [`Buffer`] by [`HttpConnection::flush`]
/// - a [`Pipeline`] of [`HttpMessage`]s for requests received but not yet answered
///
/// A parser works on [`HttpConnection::read_buf_mut`], recording what it recognizes into the
/// message returned by [`HttpConnection::begin_message`]. Once the application has staged a
/// response for a message it calls [`HttpConnection::complete`]; [`HttpConnection::next_completed`]
/// then hands messages back strictly in request order.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    writer: W,
    read_buf: Buffer,
    write_buf: Buffer,
    pipeline: Pipeline<HttpMessage>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_capacity(reader, writer, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(reader: R, writer: W, capacity: usize) -> Self {
        Self { reader, writer, read_buf: Buffer::new(capacity), write_buf: Buffer::new(capacity), pipeline: Pipeline::new() }
    }

    /// Reads once from the peer into the read buffer.
    ///
    /// Returns `Ok(0)` when the peer closed its side.
    pub async fn fill(&mut self) -> io::Result<usize> {
        let read = self.read_buf.fill_from(&mut self.reader).await?;
        if read == 0 {
            debug!("peer closed the connection");
        } else {
            trace!(read, buffered = self.read_buf.size(), "filled read buffer");
        }
        Ok(read)
    }

    /// Writes every staged byte to the peer.
    pub async fn flush(&mut self) -> io::Result<usize> {
        let written = self.write_buf.flush_to(&mut self.writer).await?;
        trace!(written, "flushed write buffer");
        Ok(written)
    }

    #[inline]
    pub fn read_buf(&self) -> &Buffer {
        &self.read_buf
    }

    #[inline]
    pub fn read_buf_mut(&mut self) -> &mut Buffer {
        &mut self.read_buf
    }

    #[inline]
    pub fn write_buf_mut(&mut self) -> &mut Buffer {
        &mut self.write_buf
    }

    /// Queues an empty message for the next request on this connection.
    pub fn begin_message(&mut self) -> MessageId {
        self.pipeline.push_back(HttpMessage::new())
    }

    pub fn message(&self, id: MessageId) -> Option<&HttpMessage> {
        self.pipeline.get(id)
    }

    pub fn message_mut(&mut self, id: MessageId) -> Option<&mut HttpMessage> {
        self.pipeline.get_mut(id)
    }

    /// Both the read and the message for `id` are done; it may leave once older ones have.
    pub fn complete(&mut self, id: MessageId) -> bool {
        self.pipeline.mark_complete(id)
    }

    /// Oldest message if it is complete.
    pub fn next_completed(&mut self) -> Option<HttpMessage> {
        self.pipeline.pop_completed()
    }

    /// Drops a message without waiting for its turn, e.g. when its request was rejected.
    pub fn abandon(&mut self, id: MessageId) -> Option<HttpMessage> {
        self.pipeline.remove(id)
    }

    /// Number of messages still in flight.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pipeline.len()
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_fill_and_flush() {
        let (client, server) = tokio::io::duplex(1024);
        let (server_read, server_write) = tokio::io::split(server);
        let (mut client_read, mut client_write) = tokio::io::split(client);

        let mut connection = HttpConnection::new(server_read, server_write);

        client_write.write_all(b"hello").await.unwrap();
        assert_eq!(connection.fill().await.unwrap(), 5);
        assert_eq!(connection.read_buf().as_slice(), b"hello");

        connection.write_buf_mut().write(b"world");
        assert_eq!(connection.flush().await.unwrap(), 5);

        let mut reply = [0u8; 5];
        client_read.read_exact(&mut reply).await.unwrap();
        assert_eq!(&reply, b"world");

        drop(client_write);
        drop(client_read);
        assert_eq!(connection.fill().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_messages_leave_in_order() {
        let (client, server) = tokio::io::duplex(64);
        let (server_read, server_write) = tokio::io::split(server);
        let mut connection = HttpConnection::new(server_read, server_write);
        drop(client);

        let first = connection.begin_message();
        let second = connection.begin_message();
        let third = connection.begin_message();
        connection.message_mut(first).unwrap().set_method(Method::GET);
        connection.message_mut(second).unwrap().set_method(Method::POST);
        assert_eq!(connection.pending(), 3);

        assert!(connection.complete(second));
        assert!(connection.next_completed().is_none());

        assert!(connection.abandon(third).is_some());
        assert!(connection.complete(first));

        assert_eq!(connection.next_completed().unwrap().method(), Some(&Method::GET));
        assert_eq!(connection.next_completed().unwrap().method(), Some(&Method::POST));
        assert!(connection.next_completed().is_none());
        assert_eq!(connection.pending(), 0);
        assert!(connection.message(first).is_none());
    }
}
