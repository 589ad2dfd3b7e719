use anyhow::{Result, bail};
use std::path::PathBuf;
use tokio::net::{TcpStream, UnixStream};

/// A resolved benchmark target: either a TCP `ip:port` pair or a
/// UNIX-domain socket path. Parsed once at startup; a malformed address is
/// a fatal usage error, never a per-iteration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix { path: PathBuf },
}

/// One established connection, closed by dropping it.
pub enum Stream {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl Endpoint {
    /// Parses a client-side target: `TCP` with `ip:port`, or `UNIX` with a
    /// filesystem path. The protocol token is a case-sensitive exact match.
    pub fn parse_target(protocol: &str, address: &str) -> Result<Endpoint> {
        match protocol {
            "TCP" => {
                let Some((host, port)) = address.split_once(':') else {
                    bail!("Invalid address format: missing port number. Use XX.XX.XX.XX:port");
                };
                if host.is_empty() {
                    bail!("Invalid address format: missing IP address. Use XX.XX.XX.XX:port");
                }
                let port: u16 = port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid port number: {}", port))?;
                Ok(Endpoint::Tcp {
                    host: host.to_string(),
                    port,
                })
            }
            "UNIX" => Ok(Endpoint::Unix {
                path: PathBuf::from(address),
            }),
            other => bail!("Unsupported protocol: {}", other),
        }
    }

    /// Parses a server-side bind address: `TCP` with a bare port number
    /// (bound to the wildcard address), or `UNIX` with a filesystem path.
    pub fn parse_bind(protocol: &str, address: &str) -> Result<Endpoint> {
        match protocol {
            "TCP" => {
                let port: u16 = address
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid port number: {}", address))?;
                Ok(Endpoint::Tcp {
                    host: "0.0.0.0".to_string(),
                    port,
                })
            }
            "UNIX" => Ok(Endpoint::Unix {
                path: PathBuf::from(address),
            }),
            other => bail!("Unsupported protocol: {}", other),
        }
    }

    /// Opens a fresh connection to the endpoint. Each call is an
    /// independent handshake; there is no reuse or pooling.
    pub async fn connect(&self) -> std::io::Result<Stream> {
        match self {
            Endpoint::Tcp { host, port } => {
                let addr = format!("{}:{}", host, port);
                Ok(Stream::Tcp(TcpStream::connect(&addr).await?))
            }
            Endpoint::Unix { path } => Ok(Stream::Unix(UnixStream::connect(path).await?)),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::Unix { path } => write!(f, "{}", path.display()),
        }
    }
}
