use clap::{Arg, Command};
use std::path::Path;

fn cli() -> Command {
    Command::new("organize")
        .about("Sweeps a tree of prober result files into a percentile CSV")
        .arg(
            Arg::new("INPUT_PATH")
                .required(true)
                .index(1)
                .help("Root of the results tree (<input>/<prefix>/<name>/*.txt)"),
        )
        .arg(
            Arg::new("OUTPUT_PATH")
                .required(true)
                .index(2)
                .help("Directory for the generated CSV (created if absent)"),
        )
        .arg(
            Arg::new("PREFIX")
                .required(true)
                .index(3)
                .help("Results subtree to sweep; names the output CSV"),
        )
}

fn main() {
    env_logger::init();
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    let input = matches.get_one::<String>("INPUT_PATH").unwrap();
    let output = matches.get_one::<String>("OUTPUT_PATH").unwrap();
    let prefix = matches.get_one::<String>("PREFIX").unwrap();

    match connbench::organize::run(Path::new(input), Path::new(output), prefix) {
        Ok(csv_path) => println!("Wrote {}", csv_path.display()),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
