//! TCP server for handling HTTP connections.
//!
//! Binds the listener the way the rest of the stack expects (SO_REUSEADDR,
//! explicit backlog) and hands it to `axum::serve`, which owns the accept
//! loop, HTTP/1.1 framing and keep-alive.

use crate::app;
use crate::config::Config;
use axum::Router;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Listen backlog
const BACKLOG: i32 = 1024;

/// Server instance
pub struct Server {
    config: Config,
    router: Router,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let router = app::router(&config)?;
        Ok(Server { config, router })
    }

    /// Bind the configured listen address.
    pub fn bind(&self) -> io::Result<TcpListener> {
        let addr: SocketAddr = self
            .config
            .listen
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = create_listener(addr)?;
        TcpListener::from_std(listener)
    }

    /// Bind and serve until the process exits.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Serve connections on `listener` forever.
    ///
    /// Failed accepts (EMFILE and friends) are logged by axum and retried
    /// after a pause rather than in a tight loop.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        info!(
            address = %listener.local_addr()?,
            matcher = %self.config.matcher,
            max_concurrent_requests = self.config.max_concurrent_requests,
            "Server listening"
        );

        axum::serve(listener, self.router.clone()).await?;
        Ok(())
    }
}

/// Create a non-blocking TCP listener with SO_REUSEADDR.
fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    Ok(socket.into())
}
