//! Wavefront emitter - a custom emitter callback for a monitoring agent
//!
//! The host agent's forwarder invokes [`forward_payload`] once per collection
//! cycle with the JSON payload it ships to its own backend. This crate
//! translates that payload into Wavefront line protocol and writes the lines
//! over one short-lived TCP connection to a Wavefront proxy.
//!
//! # Flow
//!
//! ```text
//! Agent payload (JSON) ──► decode ──► MetricSample batch ──► emitter ──► proxy
//! ```
//!
//! The crate owns no scheduling, retry, or configuration files: the host
//! agent supplies the payload and an [`EmitterConfig`] and decides on its
//! own schedule whether to retry a failed invocation.

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod emit;
pub mod error;
pub mod forward;
pub mod line;
pub mod payload;
pub mod sample;

pub use config::EmitterConfig;
pub use emit::{EmitOutcome, Emitter, StdoutEmitter, WavefrontEmitter};
pub use error::{ConfigError, EmitError, MalformedSample, PayloadError, Result};
pub use forward::forward_payload;
pub use sample::{MetricSample, RelayEndpoint};
