//! Stdout emitter for dry runs
//!
//! Renders the same lines the TCP emitter would send and prints them
//! instead. Selected by the `wf_dry_run` agent setting.

use crate::emit::{EmitOutcome, Emitter};
use crate::error::EmitError;
use crate::line;
use crate::sample::MetricSample;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Stdout emitter - prints lines for dry runs and debugging
pub struct StdoutEmitter {
    /// Count of lines printed
    emitted_count: AtomicU64,
}

impl StdoutEmitter {
    /// Create a new StdoutEmitter
    pub fn new() -> Self {
        Self {
            emitted_count: AtomicU64::new(0),
        }
    }

    /// Get total lines printed
    pub fn emitted_count(&self) -> u64 {
        self.emitted_count.load(Ordering::Relaxed)
    }
}

impl Default for StdoutEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for StdoutEmitter {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn emit(&self, samples: &[MetricSample]) -> Result<EmitOutcome, EmitError> {
        use std::io::Write;

        let mut stdout = std::io::stdout().lock();
        let mut sent = 0;
        let mut skipped = 0;

        for sample in samples {
            match line::render(sample) {
                Ok(line) => {
                    writeln!(stdout, "{line}").ok();
                    sent += 1;
                }
                Err(err) => {
                    warn!(metric = %sample.name, error = %err, "skipping malformed sample");
                    skipped += 1;
                }
            }
        }

        self.emitted_count.fetch_add(sent as u64, Ordering::Relaxed);
        Ok(EmitOutcome { sent, skipped })
    }
}
