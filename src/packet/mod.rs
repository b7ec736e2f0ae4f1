//! IRC packets: one decoded protocol line.

mod parse;
mod serialize;

/// A single IRC protocol line split into prefix, command and arguments.
///
/// The prefix is empty when the line carried none. The command is either a
/// verb (`PRIVMSG`) or a three-digit numeric (`001`). Arguments keep wire
/// order; the last one may contain spaces if it was sent as a trailing
/// parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    /// Message origin (`nick!user@host` or a server name), without the `:`.
    pub prefix: String,
    /// Command verb or numeric reply code.
    pub command: String,
    /// Positional arguments followed by the trailing argument, if any.
    pub arguments: Vec<String>,
}

impl Packet {
    /// Parse a raw protocol line.
    ///
    /// Never fails: degenerate input yields a best-effort packet, possibly
    /// with an empty command. The line must already be stripped of its
    /// terminator.
    ///
    /// ```
    /// use slirc_client::Packet;
    ///
    /// let packet = Packet::parse(":nick!u@h PRIVMSG #chan :hello world");
    /// assert_eq!(packet.prefix, "nick!u@h");
    /// assert_eq!(packet.command, "PRIVMSG");
    /// assert_eq!(packet.arguments, vec!["#chan", "hello world"]);
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Self {
        parse::tokenize(line)
    }

    /// Build a prefix-less packet.
    pub fn new<C, I, A>(command: C, arguments: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            prefix: String::new(),
            command: command.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The nick part of the prefix (everything before the first `!`).
    ///
    /// For a server prefix this is the whole server name; for a packet
    /// without prefix it is empty.
    pub fn sender(&self) -> &str {
        self.prefix.split('!').next().unwrap_or_default()
    }

    /// Argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    /// Whether the command is a three-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }
}

impl From<&str> for Packet {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

impl std::str::FromStr for Packet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
