//! Command definitions
//!
//! Represents commands from clients.

use std::fmt;

use thiserror::Error;

/// Command types, one per leading token of a request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    List,
    Delete,
    Rename,
    Upload,
    Download,
    Quit,
}

impl CommandType {
    /// All command types, in wire-name order
    pub const ALL: [CommandType; 6] = [
        CommandType::List,
        CommandType::Delete,
        CommandType::Rename,
        CommandType::Upload,
        CommandType::Download,
        CommandType::Quit,
    ];

    /// The token that selects this command on the wire
    pub fn name(&self) -> &'static str {
        match self {
            CommandType::List => "list",
            CommandType::Delete => "delete",
            CommandType::Rename => "rename",
            CommandType::Upload => "upload",
            CommandType::Download => "download",
            CommandType::Quit => "quit",
        }
    }

    /// Look up a command type by its wire token (case-sensitive)
    pub fn from_name(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == token)
    }

    /// Number of arguments the command requires
    pub fn arity(&self) -> usize {
        match self {
            CommandType::List | CommandType::Quit => 0,
            CommandType::Delete | CommandType::Upload | CommandType::Download => 1,
            CommandType::Rename => 2,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the files in the storage root
    List,

    /// Delete a file
    Delete { name: String },

    /// Rename a file
    Rename { from: String, to: String },

    /// Upload a file; raw bytes follow the server's `READY`
    Upload { name: String },

    /// Download a file; raw bytes follow the server's `SUCCESS`
    Download { name: String },

    /// End the client session (never needs a server round trip)
    Quit,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Delete { .. } => CommandType::Delete,
            Command::Rename { .. } => CommandType::Rename,
            Command::Upload { .. } => CommandType::Upload,
            Command::Download { .. } => CommandType::Download,
            Command::Quit => CommandType::Quit,
        }
    }

    /// Arguments in wire order
    pub fn args(&self) -> Vec<&str> {
        match self {
            Command::List | Command::Quit => Vec::new(),
            Command::Delete { name } | Command::Upload { name } | Command::Download { name } => {
                vec![name.as_str()]
            }
            Command::Rename { from, to } => vec![from.as_str(), to.as_str()],
        }
    }
}

/// A request line that does not decode to a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    /// Leading token names no known command; carries the raw line
    #[error("unknown command {0:?}")]
    Unknown(String),

    /// Known command with fewer arguments than it requires
    #[error("missing argument for {0}")]
    MissingArgument(CommandType),
}

/// Outcome of decoding one request line
pub type Request = std::result::Result<Command, InvalidCommand>;
