//! Sweeps a tree of prober result files into one CSV of percentile
//! digests. Layout: `<input>/<prefix>/<name>/*.txt`, one nanosecond
//! integer per line per file; output: `<output>/<prefix>.csv` with one row
//! per result file, named after its parent directory.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::stats::LatencyDigest;

const CSV_HEADER: &str = "name,average,min,max,median,p90,p95,p99";

/// Collects `<input>/<prefix>/<name>/*.txt`, sorted for deterministic row
/// order.
fn collect_result_files(input: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let root = input.join(prefix);
    let mut files = Vec::new();
    let dirs = std::fs::read_dir(&root)
        .with_context(|| format!("ERROR reading input directory {}", root.display()))?;
    for dir in dirs {
        let dir = dir?;
        if !dir.file_type()?.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(dir.path())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn read_samples(path: &Path) -> Result<Vec<i64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("ERROR opening file {}", path.display()))?;
    contents
        .lines()
        .map(|line| {
            line.parse::<i64>()
                .with_context(|| format!("ERROR parsing line {:?} in {}", line, path.display()))
        })
        .collect()
}

/// Runs the sweep and writes `<output>/<prefix>.csv`. Fatal if no result
/// files match or any line fails to parse.
pub fn run(input: &Path, output: &Path, prefix: &str) -> Result<PathBuf> {
    let files = collect_result_files(input, prefix)?;
    if files.is_empty() {
        bail!("No files found.");
    }

    let mut rows = vec![CSV_HEADER.to_string()];
    for path in &files {
        let samples = read_samples(path)?;
        let Some(digest) = LatencyDigest::from_samples(&samples) else {
            bail!("No samples in {}", path.display());
        };
        let name = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        rows.push(format!(
            "{},{},{},{},{},{},{},{}",
            name,
            digest.average,
            digest.min,
            digest.max,
            digest.median,
            digest.p90,
            digest.p95,
            digest.p99
        ));
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("ERROR creating output directory {}", output.display()))?;
    let csv_path = output.join(format!("{}.csv", prefix));
    let mut file = std::fs::File::create(&csv_path)
        .with_context(|| format!("ERROR creating output file {}", csv_path.display()))?;
    for row in &rows {
        writeln!(file, "{}", row)?;
    }
    Ok(csv_path)
}
