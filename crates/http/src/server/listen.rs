use std::fmt::Debug;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::AsRawFd;
use std::os::unix::net::{self, UnixListener, UnixStream};

/// A bound, listening socket an [`Acceptor`](super::Acceptor) can serve.
///
/// `accept` is only ever called after the descriptor was switched to non-blocking mode, and must
/// report an empty backlog as [`io::ErrorKind::WouldBlock`].
pub trait Listen: AsRawFd + Send + Sync + 'static {
    type Stream: Send + 'static;
    type Addr: Debug + Send + 'static;

    fn accept(&self) -> io::Result<(Self::Stream, Self::Addr)>;

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()>;
}

impl Listen for TcpListener {
    type Stream = TcpStream;
    type Addr = SocketAddr;

    #[inline]
    fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self)
    }

    #[inline]
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        TcpListener::set_nonblocking(self, nonblocking)
    }
}

impl Listen for UnixListener {
    type Stream = UnixStream;
    type Addr = net::SocketAddr;

    #[inline]
    fn accept(&self) -> io::Result<(UnixStream, net::SocketAddr)> {
        UnixListener::accept(self)
    }

    #[inline]
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        UnixListener::set_nonblocking(self, nonblocking)
    }
}
