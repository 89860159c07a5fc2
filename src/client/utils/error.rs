// Conversions from failures into the cause a transport hands to its listener
use crate::client::BoxedError;
use crate::error::Error;

/// Convert different error types into the boxed cause reported by `on_error`.
///
/// The cause's text reaches the caller verbatim, so wrappers that only add
/// our own prefixes are unwrapped first.
pub trait IntoTransportCause {
    fn into_cause(self) -> BoxedError;
}

impl IntoTransportCause for Error {
    fn into_cause(self) -> BoxedError {
        match self {
            Error::OpenDal { source } => Box::new(source),
            Error::Io { source } => Box::new(source),
            Error::Transport { message, .. } => message.into(),
            other => Box::new(other),
        }
    }
}
