use crate::config::ClientConfig;
use crate::error::{Error, InvalidConfigSnafu, Result};
use log::debug;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod completion;
pub mod constants;
pub mod endpoint;
pub mod operations;
pub mod transport;
mod utils;

pub use self::completion::CompletionSlot;
pub use self::endpoint::{Endpoint, PropertyBag};
pub use self::operations::{ByteChannel, FileInfo, InputContent};
pub use self::transport::{
    Action, BoxedError, ByteStream, Connector, Listener, Message, OpenDalTransport, Payload,
    Transport,
};

use self::completion::ResponseListener;
use self::constants::{
    FTP_DEFAULT_PORT, FTP_PASSIVE_MODE, PROPERTY_DESTINATION, PROPERTY_URI, SFTP_DEFAULT_PORT,
};
use self::operations::{
    ContentDecoder, IsDirectoryDecoder, ListDecoder, ResponseDecoder, SizeDecoder, UnitDecoder,
};
use self::utils::url::redact_password;

/// Remote file-transfer protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Ftp,
    Ftps,
    Sftp,
}

impl Protocol {
    /// URI scheme, always lower-case.
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Ftps => "ftps",
            Protocol::Sftp => "sftp",
        }
    }

    /// Well-known port used when the endpoint does not name one.
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp | Protocol::Ftps => FTP_DEFAULT_PORT,
            Protocol::Sftp => SFTP_DEFAULT_PORT,
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ftp" => Ok(Self::Ftp),
            "ftps" => Ok(Self::Ftps),
            "sftp" => Ok(Self::Sftp),
            _ => InvalidConfigSnafu {
                message: "only FTP, SFTP and FTPS are supported",
            }
            .fail(),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// One verb invocation before it is handed to the transport.
///
/// The constructors keep the pairing rules: only PUT and APPEND carry
/// content, only RENAME carries a destination.
pub struct OperationRequest<'a> {
    action: Action,
    path: &'a str,
    destination: Option<&'a str>,
    content: Option<InputContent>,
}

impl<'a> OperationRequest<'a> {
    fn new(action: Action, path: &'a str) -> Self {
        Self {
            action,
            path,
            destination: None,
            content: None,
        }
    }

    fn rename(origin: &'a str, destination: &'a str) -> Self {
        Self {
            action: Action::Rename,
            path: origin,
            destination: Some(destination),
            content: None,
        }
    }

    fn write(action: Action, path: &'a str, content: InputContent) -> Self {
        debug_assert!(action.carries_payload());
        Self {
            action,
            path,
            destination: None,
            content: Some(content),
        }
    }
}

/// Uniform FTP/FTPS/SFTP client.
///
/// Every verb returns a [`CompletionSlot`] immediately; the slot resolves once
/// the transport reports the outcome. Clones share the endpoint and transport.
pub struct RemoteFsClient<T: Transport = OpenDalTransport> {
    endpoint: Arc<Endpoint>,
    transport: Arc<T>,
}

impl<T: Transport> Clone for RemoteFsClient<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl RemoteFsClient<OpenDalTransport> {
    /// Initialize an endpoint backed by the OpenDAL transport.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_transport(config, OpenDalTransport::new())
    }
}

impl<T: Transport> RemoteFsClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self> {
        let endpoint = Endpoint::new(config)?;
        Ok(Self::from_parts(endpoint, Arc::new(transport)))
    }

    pub fn from_parts(endpoint: Endpoint, transport: Arc<T>) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a file; the slot resolves to a lazy stream of its content.
    pub fn get(&self, path: &str) -> CompletionSlot<ByteStream> {
        self.dispatch(OperationRequest::new(Action::Get, path), ContentDecoder::default())
    }

    /// Upload `content`, replacing any existing file.
    pub fn put(&self, path: &str, content: InputContent) -> CompletionSlot<()> {
        self.dispatch(
            OperationRequest::write(Action::Put, path, content),
            UnitDecoder,
        )
    }

    /// Append `content` to the end of a remote file.
    pub fn append(&self, path: &str, content: InputContent) -> CompletionSlot<()> {
        self.dispatch(
            OperationRequest::write(Action::Append, path, content),
            UnitDecoder,
        )
    }

    pub fn delete(&self, path: &str) -> CompletionSlot<()> {
        self.dispatch(OperationRequest::new(Action::Delete, path), UnitDecoder)
    }

    pub fn is_directory(&self, path: &str) -> CompletionSlot<bool> {
        self.dispatch(
            OperationRequest::new(Action::IsDir, path),
            IsDirectoryDecoder::default(),
        )
    }

    /// List a directory in the order the server reports its entries.
    pub fn list(&self, path: &str) -> CompletionSlot<Vec<FileInfo>> {
        self.dispatch(
            OperationRequest::new(Action::List, path),
            ListDecoder::default(),
        )
    }

    /// Create a single directory; the parent must already exist.
    pub fn mkdir(&self, path: &str) -> CompletionSlot<()> {
        self.dispatch(OperationRequest::new(Action::Mkdir, path), UnitDecoder)
    }

    /// Remove an empty directory.
    pub fn rmdir(&self, path: &str) -> CompletionSlot<()> {
        self.dispatch(OperationRequest::new(Action::Rmdir, path), UnitDecoder)
    }

    pub fn rename(&self, origin: &str, destination: &str) -> CompletionSlot<()> {
        self.dispatch(OperationRequest::rename(origin, destination), UnitDecoder)
    }

    /// Size of a remote file in bytes. Always issued in passive mode.
    pub fn size(&self, path: &str) -> CompletionSlot<u64> {
        self.dispatch(
            OperationRequest::new(Action::Size, path),
            SizeDecoder::default(),
        )
    }

    /// Build the per-call property bag and payload.
    fn prepare(&self, request: OperationRequest<'_>) -> Result<(PropertyBag, Option<Payload>)> {
        let mut properties = self.endpoint.properties().clone();
        properties.insert(PROPERTY_URI, self.endpoint.url(request.path)?);
        if let Some(destination) = request.destination {
            properties.insert(PROPERTY_DESTINATION, self.endpoint.url(destination)?);
        }
        if request.action == Action::Size {
            properties.insert(FTP_PASSIVE_MODE, true.to_string());
        }

        let payload = request
            .content
            .map(InputContent::into_payload)
            .transpose()?;
        Ok((properties, payload))
    }

    fn dispatch<D: ResponseDecoder>(
        &self,
        request: OperationRequest<'_>,
        decoder: D,
    ) -> CompletionSlot<D::Output> {
        let action = request.action;
        let (completer, slot) = completion::channel(action);

        let (properties, payload) = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(e) => {
                completer.resolve(Err(e));
                return slot;
            }
        };
        debug_assert_eq!(action.carries_payload(), payload.is_some());

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "dispatch action={} uri={}",
                action,
                properties
                    .get(PROPERTY_URI)
                    .map(redact_password)
                    .unwrap_or_default()
            );
        }

        let listener = Arc::new(ResponseListener::new(action, decoder, completer.clone()));
        match self.transport.open_connector(properties, listener) {
            Ok(connector) => {
                slot.attach(connector.clone());
                connector.send(payload, action);
            }
            Err(cause) => {
                completer.resolve(Err(Error::transport(action, cause.to_string())));
            }
        }
        slot
    }
}
