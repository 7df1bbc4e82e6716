//! Emitters for translated metric lines
//!
//! An emitter takes one borrowed batch of samples and delivers the rendered
//! lines somewhere: the Wavefront proxy over TCP, or stdout for dry runs.
//! The host agent serializes invocations, so the trait is synchronous and
//! emitters hold no state between calls.

pub mod stdout;
pub mod wavefront;

use crate::config::EmitterConfig;
use crate::error::EmitError;
use crate::sample::MetricSample;

pub use stdout::StdoutEmitter;
pub use wavefront::WavefrontEmitter;

/// Per-invocation delivery counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitOutcome {
    /// Lines fully written to the destination
    pub sent: usize,
    /// Samples skipped because they could not be rendered
    pub skipped: usize,
}

/// Emitter trait - delivers a batch of samples to one destination
///
/// # Example
///
/// ```ignore
/// struct NullEmitter;
///
/// impl Emitter for NullEmitter {
///     fn name(&self) -> &'static str { "null" }
///
///     fn emit(&self, samples: &[MetricSample]) -> Result<EmitOutcome, EmitError> {
///         Ok(EmitOutcome { sent: samples.len(), skipped: 0 })
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Emitter name for identification and logging
    fn name(&self) -> &'static str;

    /// Deliver the batch
    ///
    /// Malformed samples are skipped and counted; delivery failures abort
    /// the invocation with [`EmitError`].
    fn emit(&self, samples: &[MetricSample]) -> Result<EmitOutcome, EmitError>;
}

/// Build the emitter the configuration asks for
///
/// `wf_dry_run` selects the stdout emitter; everything else gets the TCP
/// emitter toward the configured proxy.
pub fn from_config(config: &EmitterConfig) -> Box<dyn Emitter> {
    if config.dry_run {
        Box::new(StdoutEmitter::new())
    } else {
        Box::new(WavefrontEmitter::from_config(config))
    }
}
