//! Events dispatched to application handlers.
//!
//! Every inbound packet is turned into one or more [`Event`]s, each emitted
//! under an [`EventKey`]. Scoped keys ([`EventKey::command`],
//! [`EventKey::message_to`], [`EventKey::message_from`]) let a handler
//! subscribe to one channel or one sender without filtering.

mod emitter;

use std::fmt;

use crate::packet::Packet;

pub use self::emitter::{EventEmitter, Handler, ListenerId, Listeners};

/// The kinds of event a connection emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// The transport is up.
    Connect,
    /// Any packet.
    Packet,
    /// A packet with one specific command (scoped by the command).
    Command,
    /// Any `PRIVMSG`.
    Message,
    /// A `PRIVMSG` to one target (scoped by channel or nick).
    MessageTo,
    /// A `PRIVMSG` from one sender (scoped by nick).
    MessageFrom,
    /// A `PRIVMSG` to a `#` channel.
    PublicMessage,
    /// A `PRIVMSG` to anything that is not a `#` channel.
    PrivateMessage,
    /// The server pinged us; the `PONG` has already been queued.
    Ping,
    /// Registration finished (`001`).
    Welcome,
    /// Someone joined a channel.
    Join,
    /// Someone left a channel.
    Part,
}

impl EventKind {
    /// Whether keys of this kind carry a scope value.
    pub fn is_scoped(self) -> bool {
        matches!(self, Self::Command | Self::MessageTo | Self::MessageFrom)
    }
}

/// Registry key: an [`EventKind`] plus an optional scope (command verb,
/// target or sender).
///
/// Matching is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventKey {
    kind: EventKind,
    scope: Option<String>,
}

impl EventKey {
    /// Packets whose command is exactly `command`.
    pub fn command(command: impl Into<String>) -> Self {
        Self::scoped(EventKind::Command, command)
    }

    /// Messages sent to `target` (a channel or our own nick).
    pub fn message_to(target: impl Into<String>) -> Self {
        Self::scoped(EventKind::MessageTo, target)
    }

    /// Messages sent by `sender`.
    pub fn message_from(sender: impl Into<String>) -> Self {
        Self::scoped(EventKind::MessageFrom, sender)
    }

    fn scoped(kind: EventKind, scope: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
        }
    }

    /// The kind of this key.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The scope value, for scoped kinds.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl From<EventKind> for EventKey {
    fn from(kind: EventKind) -> Self {
        Self { kind, scope: None }
    }
}

/// Renders the conventional string names (`packet_PRIVMSG`, `message#`, ...).
///
/// Target and sender scopes render as `message_to_<target>` and
/// `message_from_<sender>` so the two stay distinguishable in logs.
impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.scope.as_deref().unwrap_or_default();
        match self.kind {
            EventKind::Connect => f.write_str("connect"),
            EventKind::Packet => f.write_str("packet"),
            EventKind::Command => write!(f, "packet_{}", scope),
            EventKind::Message => f.write_str("message"),
            EventKind::MessageTo => write!(f, "message_to_{}", scope),
            EventKind::MessageFrom => write!(f, "message_from_{}", scope),
            EventKind::PublicMessage => f.write_str("message#"),
            EventKind::PrivateMessage => f.write_str("pm"),
            EventKind::Ping => f.write_str("ping"),
            EventKind::Welcome => f.write_str("welcome"),
            EventKind::Join => f.write_str("join"),
            EventKind::Part => f.write_str("part"),
        }
    }
}

/// A chat message (`PRIVMSG`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageEvent {
    /// Where the message was sent: a channel, or our nick for private messages.
    pub channel: String,
    /// Nick of the author.
    pub sender: String,
    /// Message text.
    pub message: String,
}

impl MessageEvent {
    /// Where a reply should go: the channel, or the sender for private messages.
    pub fn reply_target(&self) -> &str {
        if self.channel.starts_with('#') {
            &self.channel
        } else {
            &self.sender
        }
    }
}

/// A channel membership change (`JOIN` / `PART`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MembershipEvent {
    /// The channel joined or left.
    pub channel: String,
    /// Nick of the user who joined or left.
    pub nick: String,
}

/// Payload handed to handlers.
///
/// The owning client is passed to handlers alongside the event, so events
/// only carry data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// Transport established.
    Connect,
    /// A raw packet, for [`EventKind::Packet`] and [`EventKind::Command`].
    Packet(Packet),
    /// A chat message.
    Message(MessageEvent),
    /// Server keepalive challenge.
    Ping,
    /// Registration complete.
    Welcome,
    /// A user joined a channel.
    Join(MembershipEvent),
    /// A user left a channel.
    Part(MembershipEvent),
}

impl Event {
    /// The packet, for packet events.
    pub fn packet(&self) -> Option<&Packet> {
        match self {
            Self::Packet(packet) => Some(packet),
            _ => None,
        }
    }

    /// The message, for message events.
    pub fn message(&self) -> Option<&MessageEvent> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// The membership change, for join and part events.
    pub fn membership(&self) -> Option<&MembershipEvent> {
        match self {
            Self::Join(membership) | Self::Part(membership) => Some(membership),
            _ => None,
        }
    }
}
