//! Configuration for the Wavefront emitter
//!
//! The host agent owns configuration loading; this crate receives either a
//! ready [`EmitterConfig`] or the agent's flat settings map, from which
//! [`EmitterConfig::from_agent_settings`] reads the `wf_*` keys.

use crate::error::ConfigError;
use crate::sample::RelayEndpoint;
use serde::Deserialize;
use std::collections::HashMap;

/// Default Wavefront proxy port
pub const DEFAULT_PROXY_PORT: u16 = 2878;

/// Default socket timeout in seconds (connect and write)
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Emitter configuration, filled by the host agent once per invocation
#[derive(Debug, Clone, Deserialize)]
pub struct EmitterConfig {
    /// Wavefront proxy hostname or IP (`wf_host`, required)
    pub proxy_host: String,

    /// Proxy port listening in Wavefront format (`wf_port`)
    #[serde(default = "default_proxy_port")]
    pub proxy_port: u16,

    /// Print lines to stdout instead of opening a socket (`wf_dry_run`)
    #[serde(default)]
    pub dry_run: bool,

    /// Meta keys promoted to point tags on collector payloads (`wf_meta_tags`)
    #[serde(default)]
    pub meta_tags: Vec<String>,

    /// TCP connect timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// TCP write timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_proxy_port() -> u16 {
    DEFAULT_PROXY_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl EmitterConfig {
    /// Create a configuration with defaults for everything but the proxy host
    pub fn new(proxy_host: impl Into<String>) -> Self {
        Self {
            proxy_host: proxy_host.into(),
            proxy_port: DEFAULT_PROXY_PORT,
            dry_run: false,
            meta_tags: Vec::new(),
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            write_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the emitter settings out of the host agent's flat settings map
    ///
    /// # Errors
    /// `wf_host` is required; `wf_port`, when present, must parse as a port.
    pub fn from_agent_settings(settings: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let proxy_host = settings
            .get("wf_host")
            .ok_or(ConfigError::MissingProxyHost)?
            .clone();

        let mut config = Self::new(proxy_host);

        if let Some(port) = settings.get("wf_port") {
            config.proxy_port = port.parse().map_err(|source| ConfigError::InvalidPort {
                value: port.clone(),
                source,
            })?;
        }

        if let Some(dry_run) = settings.get("wf_dry_run") {
            config.dry_run = dry_run == "yes" || dry_run == "true";
        }

        if let Some(meta_tags) = settings.get("wf_meta_tags") {
            config.meta_tags = meta_tags
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// The relay endpoint this configuration points at
    pub fn endpoint(&self) -> RelayEndpoint {
        RelayEndpoint::new(self.proxy_host.clone(), self.proxy_port)
    }
}
