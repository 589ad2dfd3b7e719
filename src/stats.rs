//! Summary statistics over a run's nanosecond samples.
//!
//! The standard deviation is the population form (divisor N) and the
//! confidence interval uses the normal-approximation multiplier 1.96;
//! both match the reference benchmark output exactly.

/// Threshold above which the sample set is considered too noisy for the
/// mean to be trusted: margin of error > 2.5% of the mean.
const NOISE_RATIO: f64 = 0.025;

const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub mean: f64,
    pub stddev: f64,
    pub margin_of_error: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl RunSummary {
    /// Computes the summary over the full in-memory sample sequence.
    /// Returns `None` for an empty slice (a zero-iteration run).
    pub fn from_samples(samples: &[i64]) -> Option<RunSummary> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
        let stddev = (samples
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n)
            .sqrt();
        let margin_of_error = Z_95 * stddev / n.sqrt();
        Some(RunSummary {
            mean,
            stddev,
            margin_of_error,
            lower_bound: mean - margin_of_error,
            upper_bound: mean + margin_of_error,
        })
    }

    /// True when the 95% CI half-width exceeds 2.5% of the mean. Advisory
    /// only; never affects the exit status.
    pub fn is_noisy(&self) -> bool {
        self.margin_of_error > self.mean * NOISE_RATIO
    }
}

/// Per-results-file percentile digest used by the organizer. All values are
/// integer nanoseconds; the average uses integer division and the
/// percentile indices are `(n as f64 * p) as usize` over the sorted data,
/// matching the reference organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyDigest {
    pub average: i64,
    pub min: i64,
    pub max: i64,
    pub median: i64,
    pub p90: i64,
    pub p95: i64,
    pub p99: i64,
}

impl LatencyDigest {
    pub fn from_samples(samples: &[i64]) -> Option<LatencyDigest> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let pick = |p: f64| sorted[((n as f64 * p) as usize).min(n - 1)];
        Some(LatencyDigest {
            average: sorted.iter().sum::<i64>() / n as i64,
            min: sorted[0],
            max: sorted[n - 1],
            median: sorted[n / 2],
            p90: pick(0.90),
            p95: pick(0.95),
            p99: pick(0.99),
        })
    }
}
