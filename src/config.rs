//! Connection options.

use std::net::SocketAddr;

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 6667;

/// Options for [`Connection::connect`](crate::Connection::connect).
///
/// ```
/// use slirc_client::ConnectConfig;
///
/// let config = ConnectConfig::default().with_tls(true).with_force_ipv4(true);
/// assert!(config.tls);
/// assert!(config.keepalive);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectConfig {
    /// Wrap the stream in TLS.
    pub tls: bool,
    /// Enable TCP keepalive probes with short timers.
    pub keepalive: bool,
    /// Only try IPv4 addresses.
    pub force_ipv4: bool,
    /// Local address to bind before connecting.
    pub source_address: Option<SocketAddr>,
    /// Skip TLS certificate verification (self-signed servers).
    pub accept_invalid_certs: bool,
    /// Character encoding label for the line codec.
    pub encoding: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            tls: false,
            keepalive: true,
            force_ipv4: false,
            source_address: None,
            accept_invalid_certs: false,
            encoding: "utf-8".to_string(),
        }
    }
}

impl ConnectConfig {
    /// Set [`tls`](Self::tls).
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Set [`keepalive`](Self::keepalive).
    #[must_use]
    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// Set [`force_ipv4`](Self::force_ipv4).
    #[must_use]
    pub fn with_force_ipv4(mut self, force_ipv4: bool) -> Self {
        self.force_ipv4 = force_ipv4;
        self
    }

    /// Set [`source_address`](Self::source_address).
    #[must_use]
    pub fn with_source_address(mut self, source_address: SocketAddr) -> Self {
        self.source_address = Some(source_address);
        self
    }

    /// Set [`accept_invalid_certs`](Self::accept_invalid_certs).
    #[must_use]
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set [`encoding`](Self::encoding).
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }
}
