//! Socket server and connection framing.
//!
//! One client at a time: the listener accepts a single connection and is
//! then dropped; a game that wants to reconnect restarts the service. The
//! session is a loop over one connection —
//!
//! ```text
//! Idle -> Accumulating -> DispatchReady -> Idle   (per message)
//!                                       -> Closed (zero-byte read or error)
//! ```
//!
//! Bytes are appended to an accumulation buffer until the `MessageEnd`
//! substring appears; a single logical message may arrive across many
//! network reads. The complete buffer is then dispatched as one message,
//! the response is written back (terminator appended when missing), and the
//! buffer is cleared for the next command.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use physics_shared::config::ServiceConfig;
use physics_shared::protocol;

use crate::context::ServiceContext;
use crate::dispatch::MessageDispatcher;

const READ_CHUNK_LEN: usize = 4096;

/// The physics service socket server: listener plus the dispatch state for
/// the session it will serve.
pub struct SocketServer {
    listener: TcpListener,
    dispatcher: MessageDispatcher,
    ctx: ServiceContext,
}

impl SocketServer {
    /// Binds on all interfaces at `port` with the full handler registry.
    pub async fn bind(port: u16, config: ServiceConfig) -> anyhow::Result<Self> {
        Self::bind_addr(("0.0.0.0", port), config).await
    }

    /// Binds on an ephemeral localhost port. Test helper; pair with
    /// [`SocketServer::local_addr`].
    pub async fn bind_ephemeral(config: ServiceConfig) -> anyhow::Result<Self> {
        Self::bind_addr(("127.0.0.1", 0), config).await
    }

    async fn bind_addr(addr: (&str, u16), config: ServiceConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self {
            listener,
            dispatcher: MessageDispatcher::with_default_handlers(),
            ctx: ServiceContext::new(config),
        })
    }

    /// Returns the local address (after binding).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts one client and serves it until it disconnects.
    ///
    /// A zero-byte read is the client's close request: the step-measure log
    /// is flushed to disk and the socket shut down cleanly. A transport
    /// error closes the connection without the shutdown handshake or the
    /// measure flush.
    pub async fn serve_one_client(mut self) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "awaiting client connection");
        let (mut stream, peer) = self.listener.accept().await.context("tcp accept")?;
        info!(%peer, "client connected");

        // No further connections this session.
        drop(self.listener);

        let mut accumulated = BytesMut::with_capacity(READ_CHUNK_LEN);
        let mut chunk = [0u8; READ_CHUNK_LEN];

        loop {
            let read = match stream.read(&mut chunk).await {
                Ok(0) => {
                    info!("client closed the connection");
                    self.ctx
                        .measures
                        .save_to_dir(Path::new(&self.ctx.config.measures_dir))?;
                    stream.shutdown().await.context("socket shutdown")?;
                    return Ok(());
                }
                Ok(n) => n,
                Err(err) => {
                    warn!(error = %err, "transport failure, closing connection");
                    return Err(err).context("socket read");
                }
            };

            accumulated.extend_from_slice(&chunk[..read]);

            // The protocol is ASCII; lossy conversion only matters for
            // garbage input, which the dispatcher answers with a diagnostic.
            let buffered = String::from_utf8_lossy(&accumulated).into_owned();
            if !protocol::is_complete(&buffered) {
                debug!(bytes = accumulated.len(), "message incomplete, awaiting more bytes");
                continue;
            }

            let response = self.dispatcher.dispatch(&mut self.ctx, &buffered);
            let sealed = protocol::seal_response(response);
            stream
                .write_all(sealed.as_bytes())
                .await
                .context("send response")?;

            accumulated.clear();
        }
    }
}
