//! Building blocks of a small event-driven HTTP server
//!
//! This crate provides the pieces an HTTP/1.x server is assembled from: growable byte buffers
//! for connection I/O, a seeded hash table for header lookup, an HTTP message model, a pipeline
//! that keeps pipelined requests in order, and a reactor-driven acceptor that hands accepted
//! sockets to a handler.
//!
//! # Features
//!
//! - Reactor-based accepting on top of the tokio runtime, for TCP and Unix domain sockets
//! - One `on_connect` per accepted connection and one `on_error` per failed notification
//! - Growable FIFO byte buffers with peek/drain semantics
//! - Seeded hash table with separate chaining and pluggable hashing
//! - Case-insensitive header lookup preserving insertion order
//! - In-order release of pipelined messages
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpListener;
//! use tokio::runtime::Handle;
//! use tracing::{info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use micro_http_core::handler::make_handler;
//! use micro_http_core::server::{Acceptor, AcceptorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let handler = make_handler(
//!         |stream: std::net::TcpStream, peer: std::net::SocketAddr| info!(%peer, ?stream, "new connection"),
//!         |e: std::io::Error| warn!(cause = %e, "failed to accept"),
//!     );
//!
//!     let mut acceptor = Acceptor::new(Handle::current(), AcceptorConfig::default(), handler);
//!     acceptor.serve(TcpListener::bind("127.0.0.1:8080").unwrap()).unwrap();
//!
//!     tokio::signal::ctrl_c().await.unwrap();
//!     acceptor.destroy();
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`buffer`]: Growable byte buffer used for connection reads and writes
//! - [`hash`]: Seeded hash table and key hashers
//! - [`protocol`]: HTTP message, header and version types
//! - [`pipeline`]: Ordered queue of in-flight messages
//! - [`connection`]: Per-connection state tying buffers and the pipeline to a stream
//! - [`handler`]: Connection callbacks invoked by the acceptor
//! - [`server`]: The reactor-driven acceptor
//!
//! # Error Handling
//!
//! - [`server::ServeError`]: why a listener could not be served
//! - [`protocol::MessageError`]: invalid method, version, target or header
//!
//! Failed accepts are not errors of the acceptor itself; they are reported to
//! [`handler::ConnectionHandler::on_error`] and serving continues.
//!
//! # Limitations
//!
//! - Unix only, listeners are served through their raw file descriptor
//! - No request parsing or response writing, those belong to the layer above

pub mod buffer;
pub mod connection;
pub mod handler;
pub mod hash;
pub mod pipeline;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
