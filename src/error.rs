use snafu::Snafu;

use crate::client::Action;

pub type Result<T> = std::result::Result<T, Error>;

/// Caller-visible classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid protocol, malformed URI components or missing required fields.
    Config,
    /// The connector could not be opened or the remote operation failed.
    Transport,
    /// Local input content could not be read before it reached the transport.
    Io,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{message}"))]
    InvalidConfig { message: String },

    #[snafu(display("Invalid client configuration: {source}"))]
    ConfigParse { source: serde_json::Error },

    #[snafu(display(
        "URI construction failed for host '{host}', port {port}, path '{path}': {reason}"
    ))]
    UriConstruction {
        host: String,
        port: i32,
        path: String,
        reason: String,
    },

    #[snafu(display("{action} failed: {message}"))]
    Transport { action: Action, message: String },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig { .. }
            | Error::ConfigParse { .. }
            | Error::UriConstruction { .. } => ErrorKind::Config,
            Error::Transport { .. } | Error::OpenDal { .. } => ErrorKind::Transport,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Shorthand for a transport failure of `action`.
    pub fn transport(action: Action, message: impl Into<String>) -> Self {
        Error::Transport {
            action,
            message: message.into(),
        }
    }
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::ConfigParse { source: error }
    }
}
