//! Top-level translate-and-send entry point
//!
//! This is the call contract with the host agent: once per collection
//! cycle it hands over the forwarder payload and the configuration, and
//! this function decodes, emits and reports the outcome.

use crate::config::EmitterConfig;
use crate::emit::{self, EmitOutcome};
use crate::error::Result;
use crate::payload;
use serde_json::Value;
use tracing::info;

/// Translate one agent payload and deliver it to the configured target
///
/// # Errors
/// [`crate::EmitError`] when the payload cannot be decoded, the proxy is
/// unreachable, or the connection drops mid-batch. Malformed individual
/// samples never fail the invocation; they are counted in the outcome.
pub fn forward_payload(payload: &Value, config: &EmitterConfig) -> Result<EmitOutcome> {
    let samples = payload::decode(payload, config)?;
    let emitter = emit::from_config(config);
    let outcome = emitter.emit(&samples)?;
    info!(
        emitter = emitter.name(),
        sent = outcome.sent,
        skipped = outcome.skipped,
        "forwarded metrics batch"
    );
    Ok(outcome)
}
