//! Persisted configuration of one projector entry

use pjlink_coordinator::{normalize_password, ConnectionParams};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ENCODING, DEFAULT_PORT};
use crate::error::Result;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

/// Connection settings collected by the config flow
///
/// Stored as-is in the entry data. The password keeps its raw form here
/// (an empty string means none) and is only normalized when connection
/// parameters are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl ProjectorConfig {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            password: String::new(),
            encoding: default_encoding(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Password as the client should see it
    pub fn credential(&self) -> Option<String> {
        normalize_password(Some(self.password.clone()))
    }

    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams::new(
            self.host.clone(),
            self.port,
            self.name.clone(),
            self.encoding.clone(),
            self.credential(),
        )
    }
}

/// A configured projector, as the host persists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub title: String,
    /// The projector host; one entry per host
    pub unique_id: String,
    pub version: u32,
    pub data: ProjectorConfig,
}

impl ConfigEntry {
    pub const VERSION: u32 = 1;

    pub fn new(entry_id: impl Into<String>, data: ProjectorConfig) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: data.name.clone(),
            unique_id: data.host.clone(),
            version: Self::VERSION,
            data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
