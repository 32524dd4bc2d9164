//! Reactor-based connection acceptor.
//!
//! The tokio runtime plays the event loop: [`Acceptor::serve`] registers a listening socket
//! for readability, and a watcher task drains the accept backlog on every readiness
//! notification, handing each connection to a [`ConnectionHandler`](crate::handler::ConnectionHandler).
//!
//! # Components
//!
//! - [`Acceptor`]: owns the listener registration and its lifecycle
//! - [`Listen`]: listening sockets the acceptor can serve (TCP and Unix domain)
//! - [`AcceptorConfig`]: name and log level of an acceptor
//! - [`ServeError`]: why a listener was refused
//!
//! Accepting continues until `accept` reports `WouldBlock`, so a burst of connections that
//! arrived together is served by a single notification.

mod acceptor;
mod config;
mod error;
mod listen;

pub use acceptor::Acceptor;
pub use config::AcceptorConfig;
pub use error::ServeError;
pub use listen::Listen;
