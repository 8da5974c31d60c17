//! Standalone physics service binary.
//!
//! Usage:
//!   cargo run -p physics_server -- <port|nosocket>
//!
//! With a port, the server listens on all interfaces, accepts exactly one
//! client, and serves line-oriented commands until the client disconnects.
//! With the literal `nosocket`, it runs a scripted in-process demonstration
//! sequence instead.

use std::env;

use anyhow::{bail, Context};
use physics_server::demo::run_scripted_demo;
use physics_server::session::SocketServer;
use physics_shared::config::ServiceConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = env::args().skip(1);
    let Some(mode) = args.next() else {
        bail!("usage: server <port|nosocket>");
    };

    let config = ServiceConfig::default();

    if mode == "nosocket" {
        info!("running scripted demo, no socket opened");
        run_scripted_demo(config);
        return Ok(());
    }

    let port: u16 = mode
        .parse()
        .with_context(|| format!("expected a port number or 'nosocket', got '{mode}'"))?;

    let server = SocketServer::bind(port, config)
        .await
        .context("create server")?;
    info!(addr = %server.local_addr()?, "physics service listening");

    server.serve_one_client().await
}
