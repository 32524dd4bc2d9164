//! Connection handlers invoked by the [`Acceptor`](crate::server::Acceptor).
//!
//! A handler decides what happens to each accepted connection and to each failed accept. The
//! acceptor never owns that logic; it only reports events. Implement [`ConnectionHandler`]
//! directly, or build one from two closures with [`make_handler`].

use std::io;

/// Receives the events produced by an acceptor's readiness loop.
///
/// `S` is the accepted stream type and `A` the peer address type of the listener being
/// served. Both methods are called on the reactor thread and must not block.
pub trait ConnectionHandler<S, A>: Send + Sync + 'static {
    /// Called once for every accepted connection, in the order the OS returned them.
    fn on_connect(&self, stream: S, peer: A);

    /// Called at most once per readiness notification, when `accept` fails with anything
    /// other than `WouldBlock` or `Interrupted`.
    fn on_error(&self, error: io::Error);
}

/// A [`ConnectionHandler`] made of two closures.
#[derive(Debug)]
pub struct HandlerFn<C, E> {
    on_connect: C,
    on_error: E,
}

impl<S, A, C, E> ConnectionHandler<S, A> for HandlerFn<C, E>
where
    C: Fn(S, A) + Send + Sync + 'static,
    E: Fn(io::Error) + Send + Sync + 'static,
{
    fn on_connect(&self, stream: S, peer: A) {
        (self.on_connect)(stream, peer);
    }

    fn on_error(&self, error: io::Error) {
        (self.on_error)(error);
    }
}

pub fn make_handler<C, E>(on_connect: C, on_error: E) -> HandlerFn<C, E> {
    HandlerFn { on_connect, on_error }
}
