use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::net::Endpoint;
use crate::stats::RunSummary;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub endpoint: Endpoint,
    pub count: u32,
    pub output: PathBuf,
    /// The reference behavior: a single failed handshake aborts the whole
    /// measurement series. Turned off, a failed connect is logged and
    /// recorded as a missing sample instead.
    pub abort_on_error: bool,
}

/// Owned run state shared between the measurement loop and teardown: the
/// in-memory sample sequence and the output-file writer. Every recorded
/// sample is flushed to disk before `record` returns, so dropping the
/// context at any point leaves a valid prefix of results in the file.
#[derive(Debug)]
pub struct RunContext {
    samples: Vec<i64>,
    output: File,
}

impl RunContext {
    pub fn create(output_path: &Path, count: u32) -> Result<RunContext> {
        let output = File::create(output_path)
            .with_context(|| format!("ERROR opening output file {}", output_path.display()))?;
        Ok(RunContext {
            samples: Vec::with_capacity(count as usize),
            output,
        })
    }

    /// Appends one sample in memory and on disk, one decimal integer per
    /// line, flushed immediately so partial runs are durable.
    pub fn record(&mut self, duration_ns: i64) -> Result<()> {
        self.samples.push(duration_ns);
        writeln!(self.output, "{}", duration_ns).context("ERROR writing to output file")?;
        self.output.flush().context("ERROR flushing output file")?;
        Ok(())
    }

    pub fn samples(&self) -> &[i64] {
        &self.samples
    }
}

/// Runs the measurement loop: `count` strictly sequential connect
/// handshakes against the endpoint, each timed with the monotonic clock.
/// Returns `None` when no samples were collected (zero-iteration run, or
/// every attempt failed under the skip policy).
pub async fn run(config: &ProbeConfig) -> Result<Option<RunSummary>> {
    let mut ctx = RunContext::create(&config.output, config.count)?;

    for i in 0..config.count {
        let start = Instant::now();
        match config.endpoint.connect().await {
            Ok(stream) => {
                // End timestamp is taken the moment connect returns; the
                // close that follows is not part of the handshake cost.
                let duration_ns = start.elapsed().as_nanos() as i64;
                drop(stream);
                ctx.record(duration_ns)?;
                debug!("iteration {}/{}: {} ns", i + 1, config.count, duration_ns);
            }
            Err(e) if config.abort_on_error => {
                return Err(e).with_context(|| format!("ERROR connecting to {}", config.endpoint));
            }
            Err(e) => {
                warn!(
                    "iteration {}/{}: connect to {} failed, recording missing sample: {}",
                    i + 1,
                    config.count,
                    config.endpoint,
                    e
                );
            }
        }
    }

    Ok(RunSummary::from_samples(ctx.samples()))
}
