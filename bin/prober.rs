use anyhow::Result;
use clap::{Arg, ArgMatches, Command, value_parser};
use connbench::net::Endpoint;
use connbench::probe::{self, ProbeConfig};
use connbench::stats::RunSummary;
use std::path::PathBuf;
use tokio::signal;

fn cli() -> Command {
    Command::new("prober")
        .about("Measures the latency of sequential connect handshakes against an acceptor")
        .arg(
            Arg::new("PROTOCOL")
                .required(true)
                .index(1)
                .help("Transport to probe: TCP or UNIX (case-sensitive)"),
        )
        .arg(
            Arg::new("ADDRESS")
                .required(true)
                .index(2)
                .help("Target address: ip:port for TCP, a filesystem path for UNIX"),
        )
        .arg(
            Arg::new("COUNT")
                .required(true)
                .index(3)
                .value_parser(value_parser!(u32))
                .help("Number of sequential connection attempts"),
        )
        .arg(
            Arg::new("OUTPUT_PATH")
                .required(true)
                .index(4)
                .help("Results file, one nanosecond duration per line (truncated)"),
        )
        .arg(
            Arg::new("abort-on-error")
                .long("abort-on-error")
                .value_parser(value_parser!(bool))
                .default_value("true")
                .help("Abort the whole run on the first failed connect (reference behavior); false skips and records a missing sample"),
        )
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Mean: {}, Standard Deviation: {}",
        summary.mean, summary.stddev
    );
    println!(
        "95% Confidence Interval: [{}, {}]",
        summary.lower_bound, summary.upper_bound
    );
    println!(
        "95% Confidence Interval: [{:.2}%, {:.2}%]",
        (summary.lower_bound / summary.mean) * 100.0,
        (summary.upper_bound / summary.mean) * 100.0
    );
    if summary.is_noisy() {
        eprintln!("Warning: The margin of error exceeds 2.5% of the mean.");
    }
}

async fn run(matches: ArgMatches) -> Result<()> {
    let protocol = matches.get_one::<String>("PROTOCOL").unwrap();
    let address = matches.get_one::<String>("ADDRESS").unwrap();
    let count = *matches.get_one::<u32>("COUNT").unwrap();
    let output = matches.get_one::<String>("OUTPUT_PATH").unwrap();
    let abort_on_error = *matches.get_one::<bool>("abort-on-error").unwrap();

    let endpoint = Endpoint::parse_target(protocol, address)?;
    let config = ProbeConfig {
        endpoint,
        count,
        output: PathBuf::from(output),
        abort_on_error,
    };

    println!(
        "Starting performance test: protocol={}, address={}, count={}, output_path={}",
        protocol, address, count, output
    );

    tokio::select! {
        result = probe::run(&config) => {
            let summary = result?;
            println!("Performance test completed. Results written to {}", output);
            match summary {
                Some(summary) => print_summary(&summary),
                None => println!("No samples collected; skipping summary."),
            }
        }
        _ = signal::ctrl_c() => {
            // Every completed sample is already flushed; exit cleanly
            // without a summary.
            println!("Received Ctrl+C, cleaning up and exiting...");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            // Usage errors exit 1, not clap's default 2.
            let _ = e.print();
            std::process::exit(1);
        }
    };
    if let Err(e) = run(matches).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
