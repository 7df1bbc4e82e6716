//! Metric sample and relay endpoint types
//!
//! A [`MetricSample`] is one data point collected by the host agent. The
//! agent owns the batch; emitters borrow it read-only for the duration of
//! one invocation.

use std::collections::BTreeMap;
use std::fmt;

/// One collected data point for a single named metric
///
/// Tags are kept in a `BTreeMap` so a given sample always renders the same
/// line.
///
/// # Example
///
/// ```
/// use wavefront_emitter::MetricSample;
///
/// let sample = MetricSample::new("cpu.load", 0.42, 1_700_000_000, "host1")
///     .with_tag("env", "prod");
/// assert_eq!(sample.tags.get("env").map(String::as_str), Some("prod"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Metric name (e.g., "system.cpu.idle")
    pub name: String,

    /// Point value
    pub value: f64,

    /// Unix timestamp in epoch seconds
    pub timestamp: i64,

    /// Reporting host the point is attributed to
    pub source: String,

    /// Point tags, sorted by key
    pub tags: BTreeMap<String, String>,
}

impl MetricSample {
    /// Create a new sample with no tags
    pub fn new(
        name: impl Into<String>,
        value: f64,
        timestamp: i64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
            source: source.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Add a point tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Network location of the Wavefront proxy that receives translated lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    /// Proxy hostname or IP
    pub host: String,

    /// Proxy port listening in Wavefront format
    pub port: u16,
}

impl RelayEndpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
