//! Error types for the IRC client library.
//!
//! Transport failures, codec failures and handler failures all surface as
//! [`Error`]. Malformed protocol lines are never an error: the parser is total.

use thiserror::Error;

/// Convenience type alias for Results using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by a connection or its codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Every resolved address for the host failed to connect.
    #[error("no (further) addresses to try for {host}")]
    AddressesExhausted {
        /// The host that was being resolved.
        host: String,
    },

    /// The TLS handshake with the server failed.
    #[error("tls handshake with {host} failed: {source}")]
    TlsHandshake {
        /// The host the handshake was for.
        host: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The host cannot be used as a TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// The configured encoding label is not known to `encoding_rs`.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// An inbound line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes buffered without finding a line terminator.
        actual: usize,
        /// The configured limit.
        limit: usize,
    },

    /// An operation needed a transport but none is attached.
    #[error("not connected")]
    NotConnected,

    /// The server closed the stream.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// A registered event handler returned an error.
    #[error("event handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Handler(err.into())
    }
}

impl Error {
    /// Returns `true` if the error came from a registered handler rather than
    /// the transport.
    pub fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}
