//! Error types for the Wavefront emitter

use crate::sample::RelayEndpoint;
use thiserror::Error;

/// Result type alias for emitter operations
pub type Result<T> = std::result::Result<T, EmitError>;

/// Top-level error reported back to the host agent
///
/// One invocation produces at most one of these; the host agent decides
/// whether to retry on its next collection cycle.
#[derive(Error, Debug)]
pub enum EmitError {
    /// Agent settings could not be turned into a usable configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The agent payload could not be decoded into samples
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// The relay endpoint was unreachable; nothing was sent
    #[error("unable to connect to {endpoint}: {source}")]
    Connect {
        endpoint: RelayEndpoint,
        #[source]
        source: std::io::Error,
    },

    /// The connection dropped mid-batch
    ///
    /// `lines_sent` counts fully written lines; those count as delivered
    /// and are not reconciled or retried here.
    #[error("write to {endpoint} failed after {lines_sent} lines: {source}")]
    Write {
        endpoint: RelayEndpoint,
        lines_sent: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Missing or invalid agent settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `wf_host` is absent from the agent settings
    #[error("agent config missing wf_host (the Wavefront proxy host)")]
    MissingProxyHost,

    /// `wf_port` is present but not a valid port number
    #[error("invalid wf_port '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Payload-level decode failures
///
/// These abort the invocation before anything is sent. Per-sample problems
/// (null value, non-string tag) never surface here; those samples are
/// skipped individually.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The payload is not a JSON object
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// A field the collector flavor requires is absent
    #[error("payload missing required field '{0}'")]
    MissingField(&'static str),

    /// The payload bytes are not valid JSON
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-sample render failure
///
/// Always recovered locally: the sample is skipped and the rest of the
/// batch proceeds. This type never crosses the public API as an `Err`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedSample {
    /// The metric name is empty
    #[error("metric name is empty")]
    EmptyName,

    /// The value is NaN or infinite
    #[error("metric '{name}' has a non-finite value")]
    NonFiniteValue { name: String },
}
