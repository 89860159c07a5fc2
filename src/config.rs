use log::warn;
use serde::Deserialize;
use snafu::ensure;

use crate::client::Protocol;
use crate::client::constants::DEFAULT_PORT;
use crate::error::{InvalidConfigSnafu, Result};

fn default_port() -> i64 {
    i64::from(DEFAULT_PORT)
}

/// Username and password supplied under `secureSocket.basicAuth`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// The `secureSocket` block of a client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureSocket {
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

/// Raw client configuration, as supplied by the host.
///
/// Nothing is validated until [`ClientConfig::normalize`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub protocol: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: i64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure_socket: Option<SecureSocket>,
}

/// Validated configuration an endpoint is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: i32,
    pub path: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ClientConfig {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port: default_port(),
            path: String::new(),
            secure_socket: None,
        }
    }

    pub fn with_port(mut self, port: i64) -> Self {
        self.port = port;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.secure_socket = Some(SecureSocket {
            basic_auth: Some(BasicAuth {
                username: username.into(),
                password: password.into(),
            }),
        });
        self
    }

    /// Parse a configuration from its JSON mapping form.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse a configuration from an already decoded JSON mapping.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    fn basic_auth(&self) -> Option<&BasicAuth> {
        self.secure_socket
            .as_ref()
            .and_then(|socket| socket.basic_auth.as_ref())
    }

    /// Validate the protocol and host, coerce the port and pull out credentials.
    pub fn normalize(&self) -> Result<EndpointConfig> {
        let protocol: Protocol = self.protocol.parse()?;
        ensure!(
            !self.host.trim().is_empty(),
            InvalidConfigSnafu {
                message: "host must not be empty"
            }
        );

        let (username, password) = match self.basic_auth() {
            Some(auth) => (Some(auth.username.clone()), Some(auth.password.clone())),
            None => (None, None),
        };

        Ok(EndpointConfig {
            protocol,
            host: self.host.clone(),
            port: coerce_port(self.port, "port"),
            path: self.path.clone(),
            username,
            password,
        })
    }
}

/// Narrow a configured integer to a port number.
///
/// Non-positive values select the protocol default (-1); values above
/// `i32::MAX` are clamped and reported at WARN level.
pub fn coerce_port(value: i64, name: &str) -> i32 {
    if value <= 0 {
        return DEFAULT_PORT;
    }
    match i32::try_from(value) {
        Ok(port) => port,
        Err(_) => {
            warn!(
                "The value set for {name} needs to be less than {}. The {name} value is set to {}",
                i32::MAX,
                i32::MAX
            );
            i32::MAX
        }
    }
}
