//! Transport adapter boundary.
//!
//! A [`Transport`] opens one [`Connector`] per operation. The connector runs
//! the action in the background and reports back through a [`Listener`]:
//! zero or more [`Message`]s, then exactly one of `on_complete` or `on_error`.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::client::endpoint::PropertyBag;
use crate::client::operations::FileInfo;

mod actions;
mod operator;

pub use self::operator::OpenDalTransport;

/// Failure cause reported by a transport. Its text reaches the caller verbatim.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Operation tags understood by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Get,
    Put,
    Append,
    Delete,
    IsDir,
    List,
    Mkdir,
    Rmdir,
    Rename,
    Size,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Get => "GET",
            Action::Put => "PUT",
            Action::Append => "APPEND",
            Action::Delete => "DELETE",
            Action::IsDir => "ISDIR",
            Action::List => "LIST",
            Action::Mkdir => "MKDIR",
            Action::Rmdir => "RMDIR",
            Action::Rename => "RENAME",
            Action::Size => "SIZE",
        }
    }

    /// Whether the action streams a payload to the server.
    pub fn carries_payload(self) -> bool {
        matches!(self, Action::Put | Action::Append)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response delivered by a connector before it completes.
pub enum Message {
    /// File content for GET.
    Content(ByteStream),
    /// Directory entries for LIST, in server order.
    Entries(Vec<FileInfo>),
    /// Answer to ISDIR.
    IsDirectory(bool),
    /// Answer to SIZE, in bytes.
    Size(u64),
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Content(_) => f.write_str("Content(..)"),
            Message::Entries(entries) => f.debug_tuple("Entries").field(entries).finish(),
            Message::IsDirectory(value) => f.debug_tuple("IsDirectory").field(value).finish(),
            Message::Size(value) => f.debug_tuple("Size").field(value).finish(),
        }
    }
}

/// Receives the outcome of one connector send.
///
/// Calls may arrive on any thread.
pub trait Listener: Send + Sync {
    fn on_message(&self, message: Message);
    fn on_complete(&self);
    fn on_error(&self, cause: BoxedError);
}

/// A single-use connection performing one action.
///
/// The caller keeps the connector for cancellation, so it must not hold on
/// to its listener once `send` has handed it to the running action: a
/// listener dropped without reporting fails the pending slot.
pub trait Connector: Send + Sync {
    /// Start `action` in the background. `payload` is drained fully for PUT
    /// and APPEND and dropped once the action ends.
    fn send(&self, payload: Option<Payload>, action: Action);

    /// Best-effort cancellation of an in-flight send.
    fn close(&self) {}
}

/// Opens connectors from a property bag.
pub trait Transport: Send + Sync + 'static {
    fn open_connector(
        &self,
        properties: PropertyBag,
        listener: Arc<dyn Listener>,
    ) -> Result<Arc<dyn Connector>, BoxedError>;
}

/// Readable byte stream handed to the transport for uploads.
pub struct Payload {
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl Payload {
    pub fn new(reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            reader: Box::pin(reader),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }

    /// Drain the payload into memory.
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.reader.read_to_end(&mut buffer).await?;
        Ok(buffer)
    }
}

impl AsyncRead for Payload {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.reader.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

/// Lazily fetched file content. Dropping it abandons the rest of the transfer.
pub struct ByteStream {
    inner: BoxStream<'static, io::Result<Bytes>>,
}

impl ByteStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(stream::once(async move { Ok(bytes) }))
    }

    /// Collect the remaining content.
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.try_next().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer)
    }
}

impl Stream for ByteStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByteStream(..)")
    }
}
