//! # slirc-client
//!
//! An event-driven IRC client library for writing bots.
//!
//! ## Features
//!
//! - Lenient IRC packet parsing that never fails
//! - CRLF line framing with configurable text encoding
//! - Keyed event handlers with registration-order dispatch
//! - Automatic PING replies and nickname-collision retries
//! - TCP or TLS transport with keepalive, IPv4 forcing and source binding

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing packets
//!
//! ```rust
//! use slirc_client::Packet;
//!
//! let packet = Packet::parse(":nick!user@host PRIVMSG #channel :Hello there!");
//! assert_eq!(packet.sender(), "nick");
//! assert_eq!(packet.command, "PRIVMSG");
//! assert_eq!(packet.arguments, ["#channel", "Hello there!"]);
//! ```
//!
//! ### A minimal bot
//!
//! ```no_run
//! use slirc_client::{ConnectConfig, Connection, EventKind, DEFAULT_PORT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut conn = Connection::new();
//!     conn.on(EventKind::Connect, |client, _| {
//!         client.set_nick("parrot");
//!         client.send_user_registration("parrot");
//!         Ok(())
//!     });
//!     conn.on(EventKind::Welcome, |client, _| {
//!         client.join_channel("#parrots");
//!         Ok(())
//!     });
//!     conn.on(EventKind::PublicMessage, |client, event| {
//!         if let Some(msg) = event.message() {
//!             client.send_message(&msg.channel, &msg.message);
//!         }
//!         Ok(())
//!     });
//!
//!     let config = ConnectConfig::default().with_tls(true);
//!     conn.connect("irc.libera.chat", 6697, &config).await?;
//!     conn.run_loop().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod line;
pub mod packet;
pub mod transport;

pub use self::client::{Client, ConnectionState};
pub use self::config::{ConnectConfig, DEFAULT_PORT};
pub use self::connection::Connection;
pub use self::error::{Error, Result};
pub use self::event::{
    Event, EventEmitter, EventKey, EventKind, ListenerId, MembershipEvent, MessageEvent,
};
pub use self::line::LineCodec;
pub use self::packet::Packet;
pub use self::transport::{IrcStream, Transport};
