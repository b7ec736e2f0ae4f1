//! Async driver tying a [`Client`] to a [`Transport`].
//!
//! ```no_run
//! use slirc_client::{ConnectConfig, Connection, EventKind, DEFAULT_PORT};
//!
//! # async fn run() -> slirc_client::Result<()> {
//! let mut conn = Connection::new();
//! conn.on(EventKind::Connect, |client, _| {
//!     client.set_nick("ghast");
//!     client.send_user_registration("ghast");
//!     Ok(())
//! });
//! conn.on(EventKind::Welcome, |client, _| {
//!     client.join_channel("#rust");
//!     Ok(())
//! });
//!
//! conn.connect("irc.libera.chat", DEFAULT_PORT, &ConnectConfig::default()).await?;
//! conn.run_loop().await?;
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;

use tracing::{debug, info, warn};

use crate::client::{Client, ConnectionState};
use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::event::{Event, EventKey, EventKind, ListenerId};
use crate::line::LineCodec;
use crate::transport::{self, IrcStream, Transport};

/// One IRC connection: a [`Client`] plus the transport it talks over.
///
/// All processing happens on the task that calls [`run_once`](Self::run_once)
/// or [`run_loop`](Self::run_loop). Lines queued by handlers are written
/// before the next read.
#[derive(Default)]
pub struct Connection {
    client: Client,
    transport: Option<Transport>,
}

impl Connection {
    /// Create an unconnected connection with a fresh [`Client`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unconnected connection around an existing client, keeping
    /// its handlers and nick.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            transport: None,
        }
    }

    /// The session state.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Mutable access to the session state.
    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Whether a transport is attached.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Whether the attached transport is encrypted.
    pub fn is_tls(&self) -> bool {
        self.transport.as_ref().is_some_and(Transport::is_tls)
    }

    /// Register an event handler. See [`Client::on`].
    pub fn on<F>(&mut self, key: impl Into<EventKey>, handler: F) -> ListenerId
    where
        F: Fn(&mut Client, &Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.client.on(key, handler)
    }

    /// Unregister an event handler. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, key: &EventKey, id: ListenerId) -> bool {
        self.client.remove_listener(key, id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connect to `host:port`, then emit [`EventKind::Connect`].
    ///
    /// Any previous transport is dropped first.
    pub async fn connect(&mut self, host: &str, port: u16, config: &ConnectConfig) -> Result<()> {
        if self.transport.is_some() {
            self.close();
        }
        self.client.set_state(ConnectionState::Connecting);

        match Self::open(host, port, config).await {
            Ok(transport) => {
                info!(%host, port, tls = config.tls, "connected");
                self.established(transport).await
            }
            Err(e) => {
                self.client.set_state(ConnectionState::Closed);
                Err(e)
            }
        }
    }

    async fn open(host: &str, port: u16, config: &ConnectConfig) -> Result<Transport> {
        let codec = LineCodec::new(&config.encoding)?;
        let stream = transport::connect_tcp(host, port, config).await?;

        if config.tls {
            let stream = transport::wrap_tls(stream, host, config.accept_invalid_certs).await?;
            Ok(Transport::client_tls(stream, codec))
        } else {
            Ok(Transport::tcp(stream, codec))
        }
    }

    /// Adopt an already connected stream and emit [`EventKind::Connect`].
    ///
    /// Any previous transport is dropped first.
    pub async fn attach<S: IrcStream + 'static>(&mut self, stream: S) -> Result<()> {
        self.attach_with_codec(stream, LineCodec::default()).await
    }

    /// Like [`attach`](Self::attach) with a specific codec.
    pub async fn attach_with_codec<S: IrcStream + 'static>(
        &mut self,
        stream: S,
        codec: LineCodec,
    ) -> Result<()> {
        if self.transport.is_some() {
            self.close();
        }
        self.established(Transport::stream(stream, codec)).await
    }

    async fn established(&mut self, transport: Transport) -> Result<()> {
        self.transport = Some(transport);
        self.client.set_state(ConnectionState::Connected);

        let result = self.connected().await;
        if result.is_err() {
            self.close();
        }
        result
    }

    async fn connected(&mut self) -> Result<()> {
        self.client.emit(EventKind::Connect, &Event::Connect)?;
        self.flush().await
    }

    /// Drop the transport without saying goodbye.
    ///
    /// Lines still queued for this session are discarded.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            info!("connection closed");
        }
        self.discard_outgoing();
        self.client.set_state(ConnectionState::Closed);
    }

    fn discard_outgoing(&mut self) {
        let dropped = self.client.take_outgoing().len();
        if dropped > 0 {
            debug!(dropped, "discarded unsent lines");
        }
    }

    /// Send `QUIT`, flush it, then close.
    pub async fn disconnect(&mut self, reason: Option<&str>) -> Result<()> {
        let result = self.quit(reason).await;
        self.close();
        result
    }

    // =========================================================================
    // Dispatch loop
    // =========================================================================

    /// Read one line, dispatch it, and write whatever the dispatch queued.
    ///
    /// Fails with [`Error::ConnectionClosed`] when the server closes the
    /// stream. Any failure, including a handler error, closes the connection.
    pub async fn run_once(&mut self) -> Result<()> {
        let result = self.step().await;
        if let Err(e) = &result {
            if !matches!(e, Error::NotConnected) {
                warn!(error = %e, "dispatch stopped");
                self.close();
            }
        }
        result
    }

    async fn step(&mut self) -> Result<()> {
        self.flush().await?;

        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        let line = transport.read_line().await?.ok_or(Error::ConnectionClosed)?;

        // Replies queued before a handler failed still belong to this session.
        let dispatched = self.client.handle_line(&line);
        let flushed = self.flush().await;
        dispatched.and(flushed)
    }

    /// Process lines until the connection fails.
    ///
    /// Only returns on error: the server closing the stream, an I/O error, or
    /// a handler returning an error. Handler errors are not caught; they end
    /// the loop just like transport failures. There is no reconnect.
    pub async fn run_loop(&mut self) -> Result<Infallible> {
        if self.transport.is_none() {
            return Err(Error::NotConnected);
        }

        self.client.set_state(ConnectionState::Running);
        loop {
            self.run_once().await?;
        }
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Write every line the client has queued.
    ///
    /// Without a transport the queue is discarded and
    /// [`Error::NotConnected`] is returned.
    pub async fn flush(&mut self) -> Result<()> {
        if !self.client.has_outgoing() {
            return Ok(());
        }

        if self.transport.is_none() {
            self.discard_outgoing();
            return Err(Error::NotConnected);
        }

        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        while let Some(line) = self.client.pop_outgoing() {
            transport.feed_line(line).await?;
        }
        transport.flush().await
    }

    /// Send a raw line.
    pub async fn send_line(&mut self, line: impl Into<String>) -> Result<()> {
        self.client.send_line(line);
        self.flush().await
    }

    /// Send a chat message to a channel or user.
    pub async fn send_message(&mut self, target: &str, message: &str) -> Result<()> {
        self.client.send_message(target, message);
        self.flush().await
    }

    /// Send a notice.
    pub async fn send_notice(&mut self, target: &str, message: &str) -> Result<()> {
        self.client.send_notice(target, message);
        self.flush().await
    }

    /// Send a CTCP ACTION message.
    pub async fn send_action(&mut self, target: &str, action: &str) -> Result<()> {
        self.client.send_action(target, action);
        self.flush().await
    }

    /// Join a channel.
    pub async fn join_channel(&mut self, channel: &str) -> Result<()> {
        self.client.join_channel(channel);
        self.flush().await
    }

    /// Leave a channel.
    pub async fn part_channel(&mut self, channel: &str) -> Result<()> {
        self.client.part_channel(channel);
        self.flush().await
    }

    /// Set or change our nick.
    pub async fn set_nick(&mut self, nick: &str) -> Result<()> {
        self.client.set_nick(nick);
        self.flush().await
    }

    /// Send the `USER` registration line.
    pub async fn send_user_registration(&mut self, username: &str) -> Result<()> {
        self.client.send_user_registration(username);
        self.flush().await
    }

    /// Send `QUIT`. The server closes the stream in response; see
    /// [`disconnect`](Self::disconnect) to also drop it locally.
    pub async fn quit(&mut self, reason: Option<&str>) -> Result<()> {
        self.client.quit(reason);
        self.flush().await
    }
}
