use anyhow::{Context, Result};
use log::debug;
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};

use crate::net::Endpoint;

const DRAIN_CHUNK: usize = 256;

enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener),
}

/// The server side of the benchmark: accepts one connection at a time and
/// reads it to EOF, discarding the bytes. The prober never opens
/// overlapping connections, so serialized accept-then-drain is enough.
pub struct Acceptor {
    listener: Listener,
}

impl Acceptor {
    /// Binds and listens on the endpoint. For UNIX endpoints a stale socket
    /// file left by a previous run is removed first, otherwise the bind
    /// fails on restart.
    pub async fn bind(endpoint: &Endpoint) -> Result<Acceptor> {
        let listener = match endpoint {
            Endpoint::Tcp { host, port } => {
                let addr = format!("{}:{}", host, port);
                let listener = TcpListener::bind(&addr)
                    .await
                    .with_context(|| format!("ERROR on binding {}", addr))?;
                Listener::Tcp(listener)
            }
            Endpoint::Unix { path } => {
                match std::fs::remove_file(path) {
                    Ok(()) => debug!("removed stale socket file {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("ERROR removing stale socket file {}", path.display())
                        });
                    }
                }
                let listener = UnixListener::bind(path)
                    .with_context(|| format!("ERROR on binding {}", path.display()))?;
                Listener::Unix(listener)
            }
        };
        Ok(Acceptor { listener })
    }

    /// Local address of a TCP listener, so tests can bind port 0 and learn
    /// the assigned port.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match &self.listener {
            Listener::Tcp(listener) => Ok(listener.local_addr()?),
            Listener::Unix(_) => anyhow::bail!("local_addr is only available for TCP listeners"),
        }
    }

    /// Accept loop: runs until interrupted or a fatal OS error. Accept and
    /// read failures terminate the loop; there is no skip-and-continue.
    pub async fn serve(&self) -> Result<()> {
        loop {
            match &self.listener {
                Listener::Tcp(listener) => {
                    let (stream, peer) = listener.accept().await.context("ERROR on accept")?;
                    debug!("accepted connection from {}", peer);
                    let n = drain_tcp(stream).await.context("ERROR reading from socket")?;
                    debug!("connection drained, {} bytes", n);
                }
                Listener::Unix(listener) => {
                    let (stream, _) = listener.accept().await.context("ERROR on accept")?;
                    debug!("accepted connection");
                    let n = drain_unix(stream).await.context("ERROR reading from socket")?;
                    debug!("connection drained, {} bytes", n);
                }
            }
        }
    }
}

async fn drain_tcp(mut stream: TcpStream) -> std::io::Result<u64> {
    let mut buf = [0u8; DRAIN_CHUNK];
    let mut total = 0u64;
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok(total)
}

async fn drain_unix(mut stream: UnixStream) -> std::io::Result<u64> {
    let mut buf = [0u8; DRAIN_CHUNK];
    let mut total = 0u64;
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok(total)
}
