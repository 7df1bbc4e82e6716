//! TCP emitter toward the Wavefront proxy
//!
//! One invocation means one short-lived blocking connection: connect lazily
//! on the first renderable sample, write every line newline-terminated,
//! shut the stream down, return. The connection is released on every exit
//! path; a failed invocation is reported to the host agent, which retries
//! on its own schedule if at all.

use crate::config::EmitterConfig;
use crate::emit::{EmitOutcome, Emitter};
use crate::error::EmitError;
use crate::line;
use crate::sample::{MetricSample, RelayEndpoint};
use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Emitter that writes Wavefront lines over one blocking TCP connection
pub struct WavefrontEmitter {
    endpoint: RelayEndpoint,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl WavefrontEmitter {
    /// Create an emitter with the default 10s connect/write timeouts
    pub fn new(endpoint: RelayEndpoint) -> Self {
        Self {
            endpoint,
            connect_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
        }
    }

    /// Create an emitter from the full configuration
    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            endpoint: config.endpoint(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        }
    }

    /// Override the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    fn connect(&self) -> Result<TcpStream, EmitError> {
        let connect_err = |source| EmitError::Connect {
            endpoint: self.endpoint.clone(),
            source,
        };

        let addrs = (self.endpoint.host.as_str(), self.endpoint.port)
            .to_socket_addrs()
            .map_err(connect_err)?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_write_timeout(Some(self.write_timeout))
                        .map_err(connect_err)?;
                    debug!(endpoint = %self.endpoint, %addr, "connected to proxy");
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(connect_err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "endpoint resolved to no addresses")
        })))
    }
}

impl Emitter for WavefrontEmitter {
    fn name(&self) -> &'static str {
        "wavefront"
    }

    fn emit(&self, samples: &[MetricSample]) -> Result<EmitOutcome, EmitError> {
        let mut lines = Vec::with_capacity(samples.len());
        let mut skipped = 0;
        for sample in samples {
            match line::render(sample) {
                Ok(line) => lines.push(line),
                Err(err) => {
                    warn!(metric = %sample.name, error = %err, "skipping malformed sample");
                    skipped += 1;
                }
            }
        }

        // no renderable samples means no connection at all
        if lines.is_empty() {
            debug!(endpoint = %self.endpoint, skipped, "nothing to send");
            return Ok(EmitOutcome { sent: 0, skipped });
        }

        let mut stream = self.connect()?;
        match write_lines(&mut stream, &lines) {
            Ok(sent) => {
                stream.shutdown(Shutdown::Both).ok();
                Ok(EmitOutcome { sent, skipped })
            }
            Err((lines_sent, source)) => {
                error!(
                    endpoint = %self.endpoint,
                    lines_sent,
                    error = %source,
                    "connection dropped mid-batch"
                );
                // stream drops here, releasing the connection
                Err(EmitError::Write {
                    endpoint: self.endpoint.clone(),
                    lines_sent,
                    source,
                })
            }
        }
    }
}

/// Write every line newline-terminated, then flush
///
/// On failure returns the count of fully written lines; those count as
/// delivered and are never re-sent.
fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> Result<usize, (usize, io::Error)> {
    let mut sent = 0;
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|err| (sent, err))?;
        sent += 1;
    }
    writer.flush().map_err(|err| (sent, err))?;
    Ok(sent)
}
