use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncRead;

use crate::client::transport::Payload;
use crate::error::Result;

/// Readable source of bytes for a file upload.
pub enum ByteChannel {
    /// A local file, opened when the operation is dispatched.
    Path(PathBuf),
    /// An already open reader.
    Reader(Pin<Box<dyn AsyncRead + Send>>),
}

impl ByteChannel {
    fn into_payload(self) -> Result<Payload> {
        match self {
            ByteChannel::Path(path) => {
                let file = std::fs::File::open(&path)?;
                Ok(Payload::new(tokio::fs::File::from_std(file)))
            }
            ByteChannel::Reader(reader) => Ok(Payload::new(reader)),
        }
    }
}

impl fmt::Debug for ByteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteChannel::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ByteChannel::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Content supplied to `put` and `append`.
#[derive(Debug)]
pub enum InputContent {
    Channel(ByteChannel),
    /// Text sent as its UTF-8 bytes.
    Text(String),
}

impl InputContent {
    pub fn text(text: impl Into<String>) -> Self {
        InputContent::Text(text.into())
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        InputContent::Channel(ByteChannel::Path(path.as_ref().to_path_buf()))
    }

    pub fn reader(reader: impl AsyncRead + Send + 'static) -> Self {
        InputContent::Channel(ByteChannel::Reader(Box::pin(reader)))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, InputContent::Channel(_))
    }

    /// Acquire the stream handed to the transport.
    ///
    /// Fails with an IO error when a file channel cannot be opened.
    pub fn into_payload(self) -> Result<Payload> {
        match self {
            InputContent::Channel(channel) => channel.into_payload(),
            InputContent::Text(text) => Ok(Payload::from_bytes(text.into_bytes())),
        }
    }
}
