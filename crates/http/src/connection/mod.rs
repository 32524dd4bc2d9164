//! Per-connection state
//!
//! This module provides the record an application keeps for every accepted connection: the
//! stream halves, a read buffer the parser consumes from, a write buffer responses are staged
//! in, and the pipeline of requests still in flight.
//!
//! # Components
//!
//! - [`HttpConnection`]: owns the buffers and the pipeline of one connection:
//!   - Fills the read buffer from the socket as bytes arrive
//!   - Queues a fresh [`HttpMessage`](crate::protocol::HttpMessage) per pipelined request
//!   - Releases finished messages in request order
//!   - Flushes staged output back to the peer

mod http_connection;

pub use http_connection::HttpConnection;
pub use http_connection::DEFAULT_BUFFER_CAPACITY;
