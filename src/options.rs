//! Client options and configuration descriptors.

use crate::error::{ConfigError, Result};
use crate::parser::ConfigFormat;
use serde::{Deserialize, Serialize};

/// Default group for descriptors that do not name one.
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Identity of one remote configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Data id of the configuration unit (often filename-like, which drives
    /// format detection).
    pub data_id: String,

    /// Configuration group.
    #[serde(default = "default_group")]
    pub group: String,

    /// Explicit format; omit to auto-detect from the data id and content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ConfigFormat>,
}

impl CommonConfig {
    pub fn new(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: default_group(),
            format: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// The primary descriptor plus the common units loaded after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSelector {
    /// Data id of the primary configuration unit.
    pub data_id: String,

    /// Configuration group of the primary unit.
    #[serde(default = "default_group")]
    pub group: String,

    /// Explicit format for the primary unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ConfigFormat>,

    /// Whether to register for change pushes on the primary unit.
    #[serde(default)]
    pub subscribe: bool,

    /// Shared configuration units, loaded in order after the primary one.
    /// Later units overwrite earlier top-level keys.
    #[serde(default)]
    pub commons: Vec<CommonConfig>,
}

impl ConfigSelector {
    pub fn new(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: default_group(),
            format: None,
            subscribe: false,
            commons: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_subscribe(mut self, subscribe: bool) -> Self {
        self.subscribe = subscribe;
        self
    }

    pub fn with_commons(mut self, commons: Vec<CommonConfig>) -> Self {
        self.commons = commons;
        self
    }
}

/// Construction options for a [`ConfigAggregator`](crate::ConfigAggregator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Remote endpoint address. An `http(s)://` URL is reduced to its
    /// `host[:port]` part.
    pub server: String,

    /// Tenant namespace.
    pub namespace: String,

    /// Access credential.
    pub access_key: String,

    /// Secret credential.
    pub secret_key: String,

    /// Whether `${NAME}` placeholders in string values are substituted from
    /// the environment after parsing.
    #[serde(default = "default_enable_env_vars")]
    pub enable_env_vars: bool,

    /// Configuration units to load at startup. A client without one is
    /// legal; it simply never loads automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSelector>,
}

impl ClientOptions {
    /// Check the four mandatory identity fields, failing fast before any
    /// I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(ConfigError::missing_option("server"));
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::missing_option("namespace"));
        }
        if self.access_key.is_empty() {
            return Err(ConfigError::missing_option("access_key"));
        }
        if self.secret_key.is_empty() {
            return Err(ConfigError::missing_option("secret_key"));
        }
        Ok(())
    }

    /// Endpoint address with any URL scheme and path stripped.
    pub fn server_addr(&self) -> String {
        let stripped = self
            .server
            .strip_prefix("https://")
            .or_else(|| self.server.strip_prefix("http://"));
        match stripped {
            Some(rest) => rest.split('/').next().unwrap_or(rest).to_string(),
            None => self.server.clone(),
        }
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_enable_env_vars() -> bool {
    true
}
