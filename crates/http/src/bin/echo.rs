//! Echo server built on the acceptor: every byte a client sends is written back to it.
//!
//! The listen address is read from `ECHO_ADDR` and defaults to `127.0.0.1:8080`.

use std::env;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};

use micro_http_core::connection::HttpConnection;
use micro_http_core::handler::make_handler;
use micro_http_core::server::{Acceptor, AcceptorConfig};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let addr = env::var("ECHO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let listener = match TcpListener::bind(&addr) {
        Ok(listener) => listener,
        Err(e) => {
            error!(cause = %e, %addr, "bind server error");
            return;
        }
    };
    info!(%addr, "start listening");

    let handler = make_handler(on_connect, |e: io::Error| warn!(cause = %e, "failed to accept"));
    let config = AcceptorConfig::new().with_name("echo");
    let mut acceptor = Acceptor::new(Handle::current(), config, handler);

    if let Err(e) = acceptor.serve(listener) {
        error!(cause = %e, "failed to serve");
        return;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "failed to wait for shutdown signal");
    }
    acceptor.destroy();
    info!("echo server stopped");
}

fn on_connect(stream: TcpStream, peer: SocketAddr) {
    let stream = match stream.set_nonblocking(true).and_then(|()| tokio::net::TcpStream::from_std(stream)) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(cause = %e, %peer, "failed to register connection");
            return;
        }
    };

    tokio::spawn(async move {
        let (reader, writer) = stream.into_split();
        let mut connection = HttpConnection::new(reader, writer);

        loop {
            match connection.fill().await {
                Ok(0) => break,
                Ok(_) => {
                    let received = connection.read_buf_mut().split_to(usize::MAX);
                    connection.write_buf_mut().write(&received);
                }
                Err(e) => {
                    warn!(cause = %e, %peer, "read failed");
                    break;
                }
            }

            if let Err(e) = connection.flush().await {
                warn!(cause = %e, %peer, "write failed");
                break;
            }
        }

        debug!(%peer, "connection closed");
    });
}
