use std::io;
use std::os::fd::RawFd;

use thiserror::Error;

/// Reasons [`Acceptor::serve`](super::Acceptor::serve) refuses a listener.
///
/// The acceptor stays inactive whenever one of these is returned.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("acceptor is already serving descriptor {fd}")]
    AlreadyServing { fd: RawFd },

    #[error("invalid listening descriptor {fd}")]
    InvalidDescriptor { fd: RawFd },

    #[error("failed to switch listener to non-blocking mode: {source}")]
    NonBlocking { source: io::Error },

    #[error("failed to register listener with the reactor: {source}")]
    Register { source: io::Error },
}
