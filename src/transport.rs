//! Framed IRC transport over TCP, client TLS, or any async byte stream.

mod connect;
mod tls;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::error::Result;
use crate::line::LineCodec;

pub use self::connect::{
    connect_tcp, KEEPALIVE_IDLE, KEEPALIVE_INTERVAL, KEEPALIVE_RETRIES,
};
pub use self::tls::wrap_tls;

/// Byte streams a [`Transport`] can carry.
pub trait IrcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IrcStream for T {}

/// A connected stream framed into IRC lines.
#[allow(clippy::large_enum_variant)]
#[non_exhaustive]
pub enum Transport {
    /// Plain TCP transport.
    Tcp {
        /// The framed codec for TCP.
        framed: Framed<TcpStream, LineCodec>,
    },
    /// Client-side TLS-encrypted transport.
    ClientTls {
        /// The framed codec for client-side TLS.
        framed: Framed<ClientTlsStream<TcpStream>, LineCodec>,
    },
    /// Any other stream: in-memory pipes, proxies, pre-built tunnels.
    Stream {
        /// The framed codec for the boxed stream.
        framed: Framed<Box<dyn IrcStream>, LineCodec>,
    },
}

impl Transport {
    /// Frame a connected TCP stream.
    pub fn tcp(stream: TcpStream, codec: LineCodec) -> Self {
        Self::Tcp {
            framed: Framed::new(stream, codec),
        }
    }

    /// Frame an established client TLS stream.
    pub fn client_tls(stream: ClientTlsStream<TcpStream>, codec: LineCodec) -> Self {
        Self::ClientTls {
            framed: Framed::new(stream, codec),
        }
    }

    /// Frame an arbitrary stream.
    pub fn stream<S: IrcStream + 'static>(stream: S, codec: LineCodec) -> Self {
        Self::Stream {
            framed: Framed::new(Box::new(stream), codec),
        }
    }

    /// Whether the transport is encrypted.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::ClientTls { .. })
    }

    /// Wait for the next complete line.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        macro_rules! read_framed {
            ($framed:expr) => {
                $framed.next().await.transpose()
            };
        }

        let line = match self {
            Transport::Tcp { framed } => read_framed!(framed),
            Transport::ClientTls { framed } => read_framed!(framed),
            Transport::Stream { framed } => read_framed!(framed),
        }?;

        if let Some(line) = &line {
            debug!("<- {}", line);
        }
        Ok(line)
    }

    /// Buffer a line for writing without flushing.
    pub async fn feed_line(&mut self, line: String) -> Result<()> {
        macro_rules! feed_framed {
            ($framed:expr, $line:expr) => {
                $framed.feed($line).await
            };
        }

        debug!("-> {}", LineCodec::sanitize(&line));
        match self {
            Transport::Tcp { framed } => feed_framed!(framed, line),
            Transport::ClientTls { framed } => feed_framed!(framed, line),
            Transport::Stream { framed } => feed_framed!(framed, line),
        }
    }

    /// Flush buffered lines to the peer.
    pub async fn flush(&mut self) -> Result<()> {
        match self {
            Transport::Tcp { framed } => SinkExt::<String>::flush(framed).await,
            Transport::ClientTls { framed } => SinkExt::<String>::flush(framed).await,
            Transport::Stream { framed } => SinkExt::<String>::flush(framed).await,
        }
    }

    /// Write one line and flush it.
    pub async fn write_line(&mut self, line: String) -> Result<()> {
        self.feed_line(line).await?;
        self.flush().await
    }
}
