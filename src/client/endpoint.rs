use std::collections::BTreeMap;
use std::fmt;

use crate::client::Protocol;
use crate::client::constants::{AVOID_PERMISSION_CHECK, FTP_PASSIVE_MODE, USER_DIR_IS_ROOT};
use crate::client::utils::url::build_url;
use crate::config::{ClientConfig, EndpointConfig};
use crate::error::Result;

/// String-keyed options handed to the transport with every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag(BTreeMap<String, String>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Read a `"true"`/`"false"` property.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A configured remote server. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    protocol: Protocol,
    host: String,
    port: i32,
    username: Option<String>,
    password: Option<String>,
    base_path: String,
    properties: PropertyBag,
}

impl Endpoint {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::from_normalized(config.normalize()?))
    }

    pub fn from_normalized(config: EndpointConfig) -> Self {
        let properties = [
            (FTP_PASSIVE_MODE, true.to_string()),
            (USER_DIR_IS_ROOT, false.to_string()),
            (AVOID_PERMISSION_CHECK, true.to_string()),
        ]
        .into_iter()
        .collect();

        Self {
            protocol: config.protocol,
            host: config.host,
            port: config.port,
            username: config.username,
            password: config.password,
            base_path: config.path,
            properties,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Configured port, or -1 for the protocol default.
    pub fn port(&self) -> i32 {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn default_port(&self) -> u16 {
        self.protocol.default_port()
    }

    /// URL of `path` on this endpoint, credentials included.
    pub fn url(&self, path: &str) -> Result<String> {
        build_url(
            self.protocol,
            &self.host,
            self.port,
            self.username(),
            self.password(),
            path,
        )
    }

    /// URL of the configured base path.
    pub fn base_url(&self) -> Result<String> {
        self.url(&self.base_path)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("base_path", &self.base_path)
            .field("properties", &self.properties)
            .finish()
    }
}
