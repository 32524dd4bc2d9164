use std::fmt;
use std::future::poll_fn;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio::runtime::Handle;
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn, Instrument};

use super::{AcceptorConfig, Listen, ServeError};
use crate::ensure;
use crate::handler::ConnectionHandler;

/// Reactor-driven TCP (or Unix socket) acceptor.
///
/// The acceptor is bound to a tokio runtime and a [`ConnectionHandler`]. [`Acceptor::serve`]
/// registers a listening socket for readability; on every readiness notification the acceptor
/// accepts until the backlog is empty, calling [`ConnectionHandler::on_connect`] for each
/// connection. A failed accept calls [`ConnectionHandler::on_error`] once and ends that
/// notification; the acceptor keeps serving.
///
/// ```text
///   new() ──► inactive ──serve()──► active ──destroy()──► inactive
///                 │                                           ▲
///                 └──────────── serve() failed ───────────────┘
/// ```
///
/// # Example
///
/// ```no_run
/// use std::net::TcpListener;
/// use micro_http_core::handler::make_handler;
/// use micro_http_core::server::{Acceptor, AcceptorConfig};
/// use tokio::runtime::Handle;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let handler = make_handler(
///         |stream: std::net::TcpStream, peer: std::net::SocketAddr| println!("{peer} connected: {stream:?}"),
///         |e: std::io::Error| eprintln!("accept failed: {e}"),
///     );
///
///     let mut acceptor = Acceptor::new(Handle::current(), AcceptorConfig::default(), handler);
///     acceptor.serve(TcpListener::bind("127.0.0.1:8080").unwrap()).unwrap();
///
///     tokio::signal::ctrl_c().await.unwrap();
///     acceptor.destroy();
/// }
/// ```
pub struct Acceptor<L: Listen, H> {
    handle: Handle,
    handler: Arc<H>,
    config: AcceptorConfig,
    watcher: Option<Watcher<L>>,
}

/// The registered listener. The acceptor and its watcher task share it; whoever holds the lock
/// is either running an accept batch or closing the listener.
type Registered<L> = Arc<Mutex<Option<AsyncFd<L>>>>;

struct Watcher<L: Listen> {
    fd: RawFd,
    listener: Registered<L>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<L, H> Acceptor<L, H>
where
    L: Listen,
    H: ConnectionHandler<L::Stream, L::Addr>,
{
    /// Creates an inactive acceptor. No descriptor is touched until [`Acceptor::serve`].
    pub fn new(handle: Handle, config: AcceptorConfig, handler: H) -> Self {
        Self { handle, handler: Arc::new(handler), config, watcher: None }
    }

    /// Starts watching `listener` for incoming connections.
    ///
    /// The listener must already be bound and listening; it is switched to non-blocking mode
    /// here. On success the acceptor owns the listener and becomes active. On failure the
    /// listener is dropped and the acceptor stays inactive. Serving while already active is
    /// rejected with [`ServeError::AlreadyServing`].
    pub fn serve(&mut self, listener: L) -> Result<(), ServeError> {
        if let Some(watcher) = &self.watcher {
            ensure!(watcher.task.is_finished(), ServeError::AlreadyServing { fd: watcher.fd });
        }
        // the previous watcher stopped on its own, its listener is already closed
        self.watcher = None;

        let fd = listener.as_raw_fd();
        ensure!(fd >= 0, ServeError::InvalidDescriptor { fd });

        listener.set_nonblocking(true).map_err(|source| ServeError::NonBlocking { source })?;
        let listener = {
            let _runtime = self.handle.enter();
            AsyncFd::try_with_interest(listener, Interest::READABLE).map_err(|e| {
                let (_listener, source) = e.into_parts();
                ServeError::Register { source }
            })?
        };
        let listener: Registered<L> = Arc::new(Mutex::new(Some(listener)));

        let span = self.config.span();
        span.in_scope(|| info!(fd, "start serving"));

        let cancel = CancellationToken::new();
        let task = self.handle.spawn(
            watch(Arc::clone(&listener), Arc::clone(&self.handler), cancel.clone()).instrument(span),
        );

        self.watcher = Some(Watcher { fd, listener, cancel, task });
        Ok(())
    }
}

impl<L: Listen, H> Acceptor<L, H> {
    /// Stops serving: deregisters the listening socket from the reactor and closes it before
    /// returning. An accept batch already running on another worker thread is waited for, so
    /// no handler call happens once this returns. Calling it on an inactive acceptor does
    /// nothing.
    pub fn destroy(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.cancel.cancel();
            let listener = lock(&watcher.listener).take();
            drop(listener);
            self.config.span().in_scope(|| debug!(fd = watcher.fd, "stop serving"));
        }
    }

    /// Whether a listener is registered and being watched.
    pub fn is_active(&self) -> bool {
        self.watcher.as_ref().is_some_and(|watcher| !watcher.task.is_finished())
    }

    /// Descriptor being served, if any.
    pub fn fd(&self) -> Option<RawFd> {
        self.watcher.as_ref().map(|watcher| watcher.fd)
    }

    pub fn config(&self) -> &AcceptorConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<L: Listen, H> Drop for Acceptor<L, H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<L: Listen, H> fmt::Debug for Acceptor<L, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acceptor")
            .field("config", &self.config)
            .field("fd", &self.fd())
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What one wake-up of the watcher amounted to.
enum Round {
    Served(Batch),
    Failed(io::Error),
    Closed,
}

async fn watch<L, H>(listener: Registered<L>, handler: Arc<H>, cancel: CancellationToken)
where
    L: Listen,
    H: ConnectionHandler<L::Stream, L::Addr>,
{
    debug!("watching listener");

    loop {
        let round = select! {
            biased;
            () = cancel.cancelled() => break,
            round = poll_fn(|cx| poll_round(&listener, handler.as_ref(), &cancel, cx)) => round,
        };

        match round {
            Round::Served(batch) => trace!(accepted = batch.accepted, failed = batch.failed, "readiness handled"),
            Round::Failed(e) => {
                error!(cause = %e, "listener readiness failed, stop watching");
                drop(lock(&listener).take());
                handler.on_error(e);
                break;
            }
            Round::Closed => break,
        }
    }

    debug!("listener closed");
}

/// Waits for readability and drains the backlog while holding the listener, so that
/// [`Acceptor::destroy`] cannot close it in the middle of a batch.
fn poll_round<L, H>(listener: &Mutex<Option<AsyncFd<L>>>, handler: &H, cancel: &CancellationToken, cx: &mut Context<'_>) -> Poll<Round>
where
    L: Listen,
    H: ConnectionHandler<L::Stream, L::Addr> + ?Sized,
{
    let slot = lock(listener);
    let Some(listener) = slot.as_ref() else {
        return Poll::Ready(Round::Closed);
    };

    match listener.poll_read_ready(cx) {
        Poll::Pending => Poll::Pending,
        Poll::Ready(Err(e)) => Poll::Ready(Round::Failed(e)),
        Poll::Ready(Ok(mut guard)) => {
            let batch = accept_batch(guard.get_inner(), handler, cancel);
            // after a failed accept the next notification comes with the next connection
            guard.clear_ready();
            Poll::Ready(Round::Served(batch))
        }
    }
}

/// Outcome of one readiness notification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Batch {
    pub(crate) accepted: usize,
    pub(crate) failed: bool,
}

/// Accepts until the backlog is empty, the first hard error, or cancellation.
pub(crate) fn accept_batch<L, H>(listener: &L, handler: &H, cancel: &CancellationToken) -> Batch
where
    L: Listen,
    H: ConnectionHandler<L::Stream, L::Addr> + ?Sized,
{
    let mut batch = Batch::default();

    while !cancel.is_cancelled() {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(?peer, "connection accepted");
                handler.on_connect(stream, peer);
                batch.accepted += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                handler.on_error(e);
                batch.failed = true;
                break;
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of accept results; an exhausted script reads as an empty backlog.
    struct Scripted {
        script: Mutex<VecDeque<io::Result<u32>>>,
    }

    impl Scripted {
        fn new<I: IntoIterator<Item = io::Result<u32>>>(script: I) -> Self {
            Self { script: Mutex::new(script.into_iter().collect()) }
        }

        fn remaining(&self) -> usize {
            self.script.lock().unwrap().len()
        }
    }

    impl AsRawFd for Scripted {
        fn as_raw_fd(&self) -> RawFd {
            -1
        }
    }

    impl Listen for Scripted {
        type Stream = u32;
        type Addr = ();

        fn accept(&self) -> io::Result<(u32, ())> {
            match self.script.lock().unwrap().pop_front() {
                Some(result) => result.map(|stream| (stream, ())),
                None => Err(io::ErrorKind::WouldBlock.into()),
            }
        }

        fn set_nonblocking(&self, _nonblocking: bool) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counter {
        connects: Mutex<Vec<u32>>,
        errors: AtomicUsize,
    }

    impl ConnectionHandler<u32, ()> for Counter {
        fn on_connect(&self, stream: u32, _peer: ()) {
            self.connects.lock().unwrap().push(stream);
        }

        fn on_error(&self, _error: io::Error) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_accepts_until_would_block() {
        let listener = Scripted::new([Ok(1), Ok(2), Ok(3)]);
        let handler = Counter::default();

        let batch = accept_batch(&listener, &handler, &CancellationToken::new());

        assert_eq!(batch, Batch { accepted: 3, failed: false });
        assert_eq!(*handler.connects.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(handler.errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_one_error_per_notification() {
        let listener = Scripted::new([Ok(1), Err(io::Error::other("first")), Err(io::Error::other("second")), Ok(2)]);
        let handler = Counter::default();
        let cancel = CancellationToken::new();

        let batch = accept_batch(&listener, &handler, &cancel);
        assert_eq!(batch, Batch { accepted: 1, failed: true });
        assert_eq!(handler.errors.load(Ordering::SeqCst), 1);
        assert_eq!(listener.remaining(), 2);

        let batch = accept_batch(&listener, &handler, &cancel);
        assert_eq!(batch, Batch { accepted: 0, failed: true });
        assert_eq!(handler.errors.load(Ordering::SeqCst), 2);

        let batch = accept_batch(&listener, &handler, &cancel);
        assert_eq!(batch, Batch { accepted: 1, failed: false });
        assert_eq!(*handler.connects.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_interrupted_is_retried() {
        let listener = Scripted::new([Err(io::ErrorKind::Interrupted.into()), Ok(7)]);
        let handler = Counter::default();

        let batch = accept_batch(&listener, &handler, &CancellationToken::new());

        assert_eq!(batch, Batch { accepted: 1, failed: false });
        assert_eq!(handler.errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancelled_accepts_nothing() {
        let listener = Scripted::new([Ok(1)]);
        let handler = Counter::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let batch = accept_batch(&listener, &handler, &cancel);

        assert_eq!(batch, Batch::default());
        assert_eq!(listener.remaining(), 1);
    }

    #[tokio::test]
    async fn test_serve_rejects_negative_descriptor() {
        let mut acceptor = Acceptor::new(Handle::current(), AcceptorConfig::default(), Counter::default());
        assert!(!acceptor.is_active());

        let result = acceptor.serve(Scripted::new([]));
        assert!(matches!(result, Err(ServeError::InvalidDescriptor { fd: -1 })));
        assert!(!acceptor.is_active());
        assert_eq!(acceptor.fd(), None);

        acceptor.destroy();
        assert!(!acceptor.is_active());
        acceptor.destroy();
        assert!(!acceptor.is_active());
    }
}
