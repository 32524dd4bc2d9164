//! HTTP message model shared by the parser and the application.
//!
//! A parser recognizes the request line, headers and body from bytes sitting in a connection's
//! read [`Buffer`](crate::buffer::Buffer) and records them into an [`HttpMessage`]; the
//! application then reads the message back or converts it into an `http::Request` head.
//!
//! # Components
//!
//! - [`HttpMessage`]: method, path, query, version, headers and body of one message
//! - [`HttpHeader`]: a header field owned by the message
//! - [`HttpVersion`]: the major/minor protocol version pair
//! - [`MessageError`]: errors raised while filling or converting a message
//!
//! # Ownership
//!
//! The message owns its headers. Dropping or [resetting](HttpMessage::reset) a message frees
//! each header exactly once; the case-insensitive index over them only stores positions.

mod header;
pub use header::HttpHeader;

mod message;
pub use message::HttpMessage;
pub use message::DEFAULT_BODY_CAPACITY;
pub use message::DEFAULT_PATH_CAPACITY;
pub use message::DEFAULT_QUERY_CAPACITY;

mod version;
pub use version::HttpVersion;

mod error;
pub use error::MessageError;
