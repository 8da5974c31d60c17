//! Full socket-level integration tests: a raw TCP client drives the server
//! the way the game process does.

use std::time::Duration;

use anyhow::Context;
use physics_server::session::SocketServer;
use physics_shared::config::ServiceConfig;
use physics_shared::measures::MEASURES_FILE_NAME;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Binds an ephemeral server whose measures land in `measures_dir` and
/// serves one client in the background.
async fn spawn_server(
    measures_dir: &std::path::Path,
) -> anyhow::Result<(std::net::SocketAddr, JoinHandle<anyhow::Result<()>>)> {
    let config = ServiceConfig {
        measures_dir: measures_dir.to_string_lossy().into_owned(),
        ..ServiceConfig::default()
    };

    let server = SocketServer::bind_ephemeral(config).await?;
    let addr = server.local_addr()?;
    let handle = tokio::spawn(server.serve_one_client());
    Ok((addr, handle))
}

/// Reads from the stream until a full response (terminator included) has
/// arrived.
async fn read_response(stream: &mut TcpStream) -> anyhow::Result<String> {
    let mut response = String::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.context("client read")?;
        anyhow::ensure!(n > 0, "server closed before completing the response");
        response.push_str(&String::from_utf8_lossy(&chunk[..n]));
        if response.contains("MessageEnd") {
            return Ok(response);
        }
    }
}

async fn send(stream: &mut TcpStream, message: &str) -> anyhow::Result<String> {
    stream
        .write_all(message.as_bytes())
        .await
        .context("client write")?;
    read_response(stream).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_session_over_tcp() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();

    let dir = tempfile::tempdir()?;
    let (addr, handle) = spawn_server(dir.path()).await?;

    let mut client = TcpStream::connect(addr).await.context("client connect")?;

    let init = send(
        &mut client,
        "Init\nfloor;0;primary;0;0;0\nsphere;1;primary;0;0;250\nMessageEnd\n",
    )
    .await?;
    assert!(init.contains("Physics system initialized."));

    let add = send(
        &mut client,
        "AddBody\nsphere;4;primary;0;0;250;0;0;0;0;0;0\nMessageEnd\n",
    )
    .await?;
    assert!(add.contains("New body created successfully."));

    let step = send(&mut client, "Step\nMessageEnd\n").await?;
    assert!(step.lines().any(|line| line.starts_with("4;")));
    assert!(step.contains("MessageEnd"));

    let removed = send(&mut client, "RemoveBody\n4\nMessageEnd\n").await?;
    assert!(removed.contains("Body removal processed successfully."));

    let step = send(&mut client, "Step\nMessageEnd\n").await?;
    assert!(step.lines().all(|line| !line.starts_with("4;")));

    let bogus = send(&mut client, "Bogus\nMessageEnd\n").await?;
    assert!(bogus.contains("Error: Message type could not be handled."));

    let measures = send(&mut client, "GetSimulationMeasures\nMessageEnd\n").await?;
    assert_eq!(
        measures.lines().take_while(|l| *l != "MessageEnd").count(),
        2,
        "two steps recorded: {measures:?}"
    );

    // Client-initiated close: the server flushes measures and exits cleanly.
    drop(client);
    handle.await??;

    let dump = std::fs::read_to_string(dir.path().join(MEASURES_FILE_NAME))?;
    assert_eq!(dump.lines().count(), 2);

    Ok(())
}

/// Spec framing property: a message split into multiple non-empty chunks
/// dispatches exactly like the same message sent whole.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn split_chunks_reassemble_into_one_message() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (addr, handle) = spawn_server(dir.path()).await?;

    let mut client = TcpStream::connect(addr).await?;

    send(
        &mut client,
        "Init\nsphere;1;primary;0;0;250\nMessageEnd\n",
    )
    .await?;

    // Split mid-token and mid-terminator; the framer must keep accumulating
    // until the terminator substring appears.
    for chunk in ["St", "ep\nMessage", "End\n"] {
        client.write_all(chunk.as_bytes()).await?;
        client.flush().await?;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let step = read_response(&mut client).await?;
    assert!(
        step.lines().any(|line| line.starts_with("1;")),
        "chunked Step must produce a body report, got: {step:?}"
    );

    drop(client);
    handle.await??;
    Ok(())
}

/// The server accepts exactly one client per process run.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_connection_is_not_accepted() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (addr, handle) = spawn_server(dir.path()).await?;

    let mut first = TcpStream::connect(addr).await?;
    send(&mut first, "Init\nMessageEnd\n").await?;

    // The listener is dropped once the first client is in; a second connect
    // attempt must fail outright or be left unserved.
    match TcpStream::connect(addr).await {
        Err(_) => {}
        Ok(mut second) => {
            second.write_all(b"Step\nMessageEnd\n").await?;
            let mut buf = [0u8; 64];
            let n = tokio::time::timeout(Duration::from_millis(200), second.read(&mut buf))
                .await
                .map(|r| r.unwrap_or(0))
                .unwrap_or(0);
            assert_eq!(n, 0, "second client must never receive a response");
        }
    }

    drop(first);
    handle.await??;
    Ok(())
}
