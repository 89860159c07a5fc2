use log::debug;
use opendal::Operator;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use url::Url;

use super::{Action, BoxedError, Connector, Listener, Payload, Transport, actions};
use crate::client::Protocol;
use crate::client::constants::{FTP_PASSIVE_MODE, PROPERTY_DESTINATION, PROPERTY_URI};
use crate::client::endpoint::PropertyBag;
use crate::client::utils::error::IntoTransportCause;
use crate::client::utils::url::{decode_component, redact_password};
use crate::error::Result;

/// Transport backed by OpenDAL's `ftp` and `sftp` services.
///
/// Each connector builds its own [`Operator`] rooted at `/` and runs the
/// action on the tokio runtime that was current when it was opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenDalTransport;

impl OpenDalTransport {
    pub fn new() -> Self {
        Self
    }
}

/// The server and path a `uri` property points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteTarget {
    pub protocol: Protocol,
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub path: String,
}

impl RemoteTarget {
    pub(crate) fn parse(uri: &str) -> std::result::Result<Self, BoxedError> {
        let url = Url::parse(uri).map_err(|e| format!("invalid uri: {e}"))?;
        let protocol: Protocol = url.scheme().parse()?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or("uri has no host")?
            .to_string();
        let username = Some(url.username())
            .filter(|user| !user.is_empty())
            .map(decode_component);
        let password = url.password().map(decode_component);

        Ok(Self {
            protocol,
            host,
            port: url.port(),
            username,
            password,
            path: decode_component(url.path()),
        })
    }

    fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    fn build_operator(&self) -> Result<Operator> {
        match self.protocol {
            Protocol::Ftp | Protocol::Ftps => self.build_ftp_operator(),
            Protocol::Sftp => self.build_sftp_operator(),
        }
    }

    #[cfg(feature = "ftp")]
    fn build_ftp_operator(&self) -> Result<Operator> {
        let endpoint = format!(
            "{}://{}:{}",
            self.protocol,
            self.host,
            self.port_or_default()
        );
        let mut builder = opendal::services::Ftp::default()
            .endpoint(&endpoint)
            .root("/");
        if let Some(user) = &self.username {
            builder = builder.user(user);
        }
        if let Some(password) = &self.password {
            builder = builder.password(password);
        }
        Ok(Operator::new(builder)?.finish())
    }

    #[cfg(not(feature = "ftp"))]
    fn build_ftp_operator(&self) -> Result<Operator> {
        Err(crate::error::Error::InvalidConfig {
            message: format!("{} support is disabled (feature `ftp`)", self.protocol),
        })
    }

    #[cfg(feature = "sftp")]
    fn build_sftp_operator(&self) -> Result<Operator> {
        let endpoint = format!("ssh://{}:{}", self.host, self.port_or_default());
        let mut builder = opendal::services::Sftp::default()
            .endpoint(&endpoint)
            .root("/");
        if let Some(user) = &self.username {
            builder = builder.user(user);
        }
        if self.password.is_some() {
            debug!(
                "sftp password ignored for {}; ssh agent or key authentication is used",
                self.host
            );
        }
        Ok(Operator::new(builder)?.finish())
    }

    #[cfg(not(feature = "sftp"))]
    fn build_sftp_operator(&self) -> Result<Operator> {
        Err(crate::error::Error::InvalidConfig {
            message: "sftp support is disabled (feature `sftp`)".to_string(),
        })
    }
}

impl Transport for OpenDalTransport {
    fn open_connector(
        &self,
        properties: PropertyBag,
        listener: Arc<dyn Listener>,
    ) -> std::result::Result<Arc<dyn Connector>, BoxedError> {
        let runtime =
            Handle::try_current().map_err(|e| format!("no tokio runtime available: {e}"))?;
        let uri = properties
            .get(PROPERTY_URI)
            .ok_or("missing 'uri' property")?;
        let target = RemoteTarget::parse(uri)?;
        let destination = properties
            .get(PROPERTY_DESTINATION)
            .map(RemoteTarget::parse)
            .transpose()?
            .map(|destination| destination.path);

        if properties.flag(FTP_PASSIVE_MODE) == Some(false) {
            debug!("active ftp mode requested; the ftp service always connects passively");
        }

        let operator = target.build_operator().map_err(IntoTransportCause::into_cause)?;
        debug!("connector opened uri={}", redact_password(uri));

        Ok(Arc::new(OpenDalConnector {
            operator,
            path: target.path,
            destination,
            listener: Mutex::new(Some(listener)),
            runtime,
            task: Mutex::new(None),
        }))
    }
}

/// Runs one action against an operator and reports to the listener.
///
/// `send` moves the listener into the spawned task, so a task dropped
/// before it reports (runtime shutdown, abort) releases the slot.
pub(crate) struct OpenDalConnector {
    operator: Operator,
    path: String,
    destination: Option<String>,
    listener: Mutex<Option<Arc<dyn Listener>>>,
    runtime: Handle,
    task: Mutex<Option<AbortHandle>>,
}

impl Connector for OpenDalConnector {
    fn send(&self, payload: Option<Payload>, action: Action) {
        let Some(listener) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            debug!("connector already sent, ignoring action={action}");
            return;
        };
        let operator = self.operator.clone();
        let path = self.path.clone();
        let destination = self.destination.clone();

        let handle = self.runtime.spawn(async move {
            let outcome = actions::execute(
                &operator,
                action,
                &path,
                destination.as_deref(),
                payload,
                listener.as_ref(),
            )
            .await;
            debug!("connector finished action={action} path={path} ok={}", outcome.is_ok());
            match outcome {
                Ok(()) => listener.on_complete(),
                Err(e) => listener.on_error(e.into_cause()),
            }
        });

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle.abort_handle());
    }

    fn close(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            debug!("connector closed path={}", self.path);
            task.abort();
        }
    }
}
