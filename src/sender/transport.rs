//! Transport primitives for the sender.

use std::{
    fmt,
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    path::PathBuf,
    time::{Duration, Instant},
};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Host prefix selecting a Unix domain socket endpoint.
pub const UNIX_SCHEME: &str = "unix://";

/// Collector endpoint targeted by the sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// TCP collector.
    Tcp(TcpEndpoint),
    /// Unix domain socket collector.
    Unix(UnixEndpoint),
}

impl Endpoint {
    /// Interpret a host string and port the way collector URLs are written.
    ///
    /// Hosts starting with [`UNIX_SCHEME`] name a socket path and `port` is
    /// ignored; anything else is a TCP host.
    pub fn parse(host: &str, port: u16) -> Self {
        match host.strip_prefix(UNIX_SCHEME) {
            Some(path) => Endpoint::Unix(UnixEndpoint { path: path.into() }),
            None => Endpoint::Tcp(TcpEndpoint {
                host: host.to_owned(),
                port,
            }),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(tcp) => write!(f, "{}:{}", tcp.host, tcp.port),
            Endpoint::Unix(unix) => write!(f, "{UNIX_SCHEME}{}", unix.path.display()),
        }
    }
}

/// TCP endpoint configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpEndpoint {
    /// Hostname or IP address to connect to.
    pub host: String,
    /// TCP port number.
    pub port: u16,
}

impl TcpEndpoint {
    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map(|iter| iter.collect())
    }
}

/// Unix domain socket configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnixEndpoint {
    /// Path to the socket file.
    pub path: PathBuf,
}

/// Live stream to the collector.
pub enum ActiveConnection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ActiveConnection {
    fn set_timeouts(&self, timeout: Duration) -> io::Result<()> {
        match self {
            ActiveConnection::Tcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
        }
    }

    /// Write a full buffer to the socket and flush it.
    ///
    /// `write_all` retries short writes; anything it cannot finish within the
    /// write timeout surfaces as an error.
    pub fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            ActiveConnection::Tcp(stream) => {
                stream.write_all(buf)?;
                stream.flush()
            }
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => {
                stream.write_all(buf)?;
                stream.flush()
            }
        }
    }

    /// Shut the stream down in both directions.
    pub fn shutdown(&self) -> io::Result<()> {
        match self {
            ActiveConnection::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.shutdown(Shutdown::Both),
        }
    }
}

impl fmt::Debug for ActiveConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveConnection::Tcp(stream) => f
                .debug_tuple("Tcp")
                .field(&stream.peer_addr().ok())
                .finish(),
            #[cfg(unix)]
            ActiveConnection::Unix(_) => f.write_str("Unix"),
        }
    }
}

fn connect_tcp(config: &TcpEndpoint, timeout: Duration) -> io::Result<TcpStream> {
    let addrs = config.socket_addrs()?;
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {}:{}", config.host, config.port),
        ));
    }
    connect_any(&addrs, Instant::now() + timeout)
}

/// Try each address in turn until `deadline`. The attempts share one
/// budget, so a host resolving to several addresses still blocks for at
/// most the configured timeout.
fn connect_any(addrs: &[SocketAddr], deadline: Instant) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match TcpStream::connect_timeout(addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::TimedOut, "connect timeout elapsed")
    }))
}

/// Establish a connection to `endpoint`, applying `timeout` to the connect
/// and to all subsequent reads and writes.
pub fn connect_endpoint(endpoint: &Endpoint, timeout: Duration) -> io::Result<ActiveConnection> {
    let connection = match endpoint {
        Endpoint::Tcp(config) => ActiveConnection::Tcp(connect_tcp(config, timeout)?),
        Endpoint::Unix(config) => {
            #[cfg(unix)]
            {
                ActiveConnection::Unix(UnixStream::connect(&config.path)?)
            }
            #[cfg(not(unix))]
            {
                let _ = config;
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix domain sockets are not supported on this platform",
                ));
            }
        }
    };
    connection.set_timeouts(timeout)?;
    Ok(connection)
}
