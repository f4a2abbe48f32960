//! big-cookie: An HTTP server for observing oversized cookie handling
//!
//! Two pieces, connected only through the client's cookie jar:
//! - `GET /set-cookie` sets a 5000-character `largeCookie`
//! - An interceptor logs the length of `largeCookie` on every request
//!
//! Features:
//! - Configurable cookie size, attributes and interceptor path pattern
//! - Bounded request concurrency
//! - Configuration via CLI arguments or TOML file

mod app;
mod config;
mod server;

#[cfg(test)]
mod testing;

use config::Config;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 0 means one worker per CPU
    let workers = config.workers.filter(|&n| n > 0).unwrap_or_else(num_cpus);

    info!(
        listen = %config.listen,
        workers,
        cookie_name = %config.cookie.name,
        cookie_length = config.cookie.length,
        max_concurrent_requests = config.max_concurrent_requests,
        "Starting big-cookie server"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?;

    let server = Server::new(config)?;
    runtime.block_on(server.run())
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
