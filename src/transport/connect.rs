//! Address resolution and TCP connection setup.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tracing::{info, warn};

use crate::config::ConnectConfig;
use crate::error::{Error, Result};

/// Idle time before the first keepalive probe.
pub const KEEPALIVE_IDLE: Duration = Duration::from_secs(180);
/// Time between keepalive probes.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);
/// Unanswered probes before the connection is dropped.
pub const KEEPALIVE_RETRIES: u32 = 12;

/// Resolve `host` and connect to the first candidate that accepts.
///
/// Candidates are tried in resolver order. Non-IPv4 candidates are skipped
/// when [`ConnectConfig::force_ipv4`] is set. Fails with
/// [`Error::AddressesExhausted`] once every candidate has been tried.
pub async fn connect_tcp(host: &str, port: u16, config: &ConnectConfig) -> Result<TcpStream> {
    for addr in lookup_host((host, port)).await? {
        if config.force_ipv4 && !addr.is_ipv4() {
            info!(%addr, "skipping non-ipv4 address");
            continue;
        }

        info!(%addr, "trying address");
        match connect_addr(addr, config).await {
            Ok(stream) => return Ok(stream),
            Err(e) => warn!(%addr, error = %e, "connect failed"),
        }
    }

    Err(Error::AddressesExhausted {
        host: host.to_string(),
    })
}

async fn connect_addr(addr: SocketAddr, config: &ConnectConfig) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    if let Some(source) = config.source_address {
        socket.bind(source)?;
    }

    let stream = socket.connect(addr).await?;
    if config.keepalive {
        if let Err(e) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
    }
    Ok(stream)
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_IDLE)
        .with_interval(KEEPALIVE_INTERVAL);
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "freebsd"
    ))]
    let keepalive = keepalive.with_retries(KEEPALIVE_RETRIES);

    sock.set_tcp_keepalive(&keepalive)
}
