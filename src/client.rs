//! Sans-IO IRC client state machine.
//!
//! [`Client`] owns everything about a session except the socket: the
//! current nick, the lifecycle state, the event registry and a queue of
//! outbound lines. It consumes parsed packets and produces lines to send,
//! so it can be driven by [`Connection`](crate::Connection) or fed by hand
//! in tests.
//!
//! # Example
//!
//! ```
//! use slirc_client::{Client, EventKind};
//!
//! let mut client = Client::new();
//! client.on(EventKind::Welcome, |client, _event| {
//!     client.join_channel("#rust");
//!     Ok(())
//! });
//!
//! client.handle_line(":irc.example.com 001 bot :Welcome").unwrap();
//! assert_eq!(client.take_outgoing(), vec!["JOIN #rust"]);
//! ```

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::event::{
    Event, EventEmitter, EventKey, EventKind, ListenerId, MembershipEvent, MessageEvent,
};
use crate::packet::Packet;

/// Lifecycle of a connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No transport.
    #[default]
    Idle,
    /// Resolving and opening the transport.
    Connecting,
    /// Transport open and the connect event has fired.
    Connected,
    /// Inside the dispatch loop.
    Running,
    /// Transport ended or failed.
    Closed,
}

/// Session state and dispatch logic for one IRC connection.
#[derive(Debug, Default)]
pub struct Client {
    nick: String,
    state: ConnectionState,
    events: EventEmitter<EventKey, Client, Event>,
    outgoing: VecDeque<String>,
}

impl Client {
    /// Create a client with no nick and no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The nick we last asked the server for.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "connection state change");
            self.state = state;
        }
    }

    // =========================================================================
    // Handler registry
    // =========================================================================

    /// Register `handler` for `key`.
    ///
    /// Handlers run synchronously during dispatch and may call back into the
    /// client (send lines, register or remove handlers). An error returned by
    /// a handler aborts the current dispatch and is propagated to the caller
    /// of [`handle_packet`](Self::handle_packet).
    pub fn on<F>(&mut self, key: impl Into<EventKey>, handler: F) -> ListenerId
    where
        F: Fn(&mut Client, &Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.add_listener(key, handler)
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, key: &EventKey, id: ListenerId) -> bool {
        self.events.remove_listener(key, id)
    }

    /// The handler registry.
    pub fn events(&self) -> &EventEmitter<EventKey, Client, Event> {
        &self.events
    }

    /// Mutable access to the handler registry.
    pub fn events_mut(&mut self) -> &mut EventEmitter<EventKey, Client, Event> {
        &mut self.events
    }

    /// Run the handlers registered for `key`.
    pub fn emit(&mut self, key: impl Into<EventKey>, event: &Event) -> Result<()> {
        let key = key.into();
        let listeners = self.events.listeners(&key);
        if listeners.is_empty() {
            return Ok(());
        }
        trace!(event = %key, handlers = listeners.len(), "emitting");
        listeners.emit(self, event)?;
        Ok(())
    }

    // =========================================================================
    // Inbound dispatch
    // =========================================================================

    /// Parse and dispatch one protocol line.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        self.handle_packet(&Packet::parse(line))
    }

    /// Dispatch one packet: automatic protocol replies first, then events.
    pub fn handle_packet(&mut self, packet: &Packet) -> Result<()> {
        let event = Event::Packet(packet.clone());
        self.emit(EventKind::Packet, &event)?;
        self.emit(EventKey::command(packet.command.as_str()), &event)?;

        match packet.command.as_str() {
            "PRIVMSG" => self.handle_privmsg(packet),
            "PING" => {
                let token = packet.arg(0).unwrap_or_default();
                self.send_line(format!("PONG :{}", token));
                self.emit(EventKind::Ping, &Event::Ping)
            }
            // ERR_NICKNAMEINUSE, ERR_UNAVAILRESOURCE
            "433" | "437" => {
                let nick = format!("{}_", self.nick);
                info!(rejected = %self.nick, retry = %nick, "nickname unavailable");
                self.set_nick(nick);
                Ok(())
            }
            "001" => self.emit(EventKind::Welcome, &Event::Welcome),
            "JOIN" => {
                let event = Event::Join(Self::membership(packet));
                self.emit(EventKind::Join, &event)
            }
            "PART" => {
                let event = Event::Part(Self::membership(packet));
                self.emit(EventKind::Part, &event)
            }
            _ => Ok(()),
        }
    }

    fn handle_privmsg(&mut self, packet: &Packet) -> Result<()> {
        let (Some(target), Some(text)) = (packet.arg(0), packet.arg(1)) else {
            warn!(packet = %packet, "PRIVMSG without target and text");
            return Ok(());
        };

        let message = MessageEvent {
            channel: target.to_owned(),
            sender: packet.sender().to_owned(),
            message: text.to_owned(),
        };
        let sender_key = EventKey::message_from(message.sender.as_str());
        let public = target.starts_with('#');
        let event = Event::Message(message);

        self.emit(EventKind::Message, &event)?;
        self.emit(EventKey::message_to(target), &event)?;
        self.emit(sender_key, &event)?;
        if public {
            self.emit(EventKind::PublicMessage, &event)
        } else {
            self.emit(EventKind::PrivateMessage, &event)
        }
    }

    fn membership(packet: &Packet) -> MembershipEvent {
        MembershipEvent {
            channel: packet.arg(0).unwrap_or_default().to_owned(),
            nick: packet.sender().to_owned(),
        }
    }

    // =========================================================================
    // Outbound commands
    // =========================================================================

    /// Queue a raw line. The codec appends `\r\n`.
    pub fn send_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        trace!(%line, "queued");
        self.outgoing.push_back(line);
    }

    /// Send a chat message to a channel or user.
    pub fn send_message(&mut self, target: &str, message: &str) {
        self.send_line(format!("PRIVMSG {} :{}", target, message));
    }

    /// Send a notice.
    pub fn send_notice(&mut self, target: &str, message: &str) {
        self.send_line(format!("NOTICE {} :{}", target, message));
    }

    /// Send a CTCP ACTION ("/me") message.
    pub fn send_action(&mut self, target: &str, action: &str) {
        self.send_message(target, &format!("\x01ACTION {}\x01", action));
    }

    /// Join a channel.
    pub fn join_channel(&mut self, channel: &str) {
        self.send_line(format!("JOIN {}", channel));
    }

    /// Leave a channel.
    pub fn part_channel(&mut self, channel: &str) {
        self.send_line(format!("PART {}", channel));
    }

    /// Set or change our nick.
    ///
    /// If the server rejects it as in use, an underscore is appended and the
    /// request is retried, with no limit on the number of attempts.
    pub fn set_nick(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
        let line = format!("NICK {}", self.nick);
        self.send_line(line);
    }

    /// Send the `USER` registration line, using `username` as real name too.
    pub fn send_user_registration(&mut self, username: &str) {
        self.send_line(format!("USER {} 0 * :{}", username, username));
    }

    /// Disconnect from the server.
    pub fn quit(&mut self, reason: Option<&str>) {
        match reason {
            Some(reason) => self.send_line(format!("QUIT :{}", reason)),
            None => self.send_line("QUIT"),
        }
    }

    // =========================================================================
    // Outbox
    // =========================================================================

    /// Whether lines are waiting to be written.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Drain every queued line, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        self.outgoing.drain(..).collect()
    }

    pub(crate) fn pop_outgoing(&mut self) -> Option<String> {
        self.outgoing.pop_front()
    }
}
