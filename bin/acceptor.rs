use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use connbench::net::{Acceptor, Endpoint};
use tokio::signal;

fn cli() -> Command {
    Command::new("acceptor")
        .about("Accepts connections one at a time and drains each to EOF")
        .arg(
            Arg::new("PROTOCOL")
                .required(true)
                .index(1)
                .help("Transport to serve: TCP or UNIX (case-sensitive)"),
        )
        .arg(
            Arg::new("ADDRESS")
                .required(true)
                .index(2)
                .help("Port number for TCP (wildcard bind), a filesystem path for UNIX"),
        )
}

async fn run(matches: ArgMatches) -> Result<()> {
    let protocol = matches.get_one::<String>("PROTOCOL").unwrap();
    let address = matches.get_one::<String>("ADDRESS").unwrap();

    let endpoint = Endpoint::parse_bind(protocol, address)?;
    println!("Starting {} server on {}", protocol, address);
    let acceptor = Acceptor::bind(&endpoint).await?;
    println!("{} server listening on {}", protocol, address);

    tokio::select! {
        result = acceptor.serve() => result,
        _ = signal::ctrl_c() => {
            println!("Received Ctrl+C, closing socket and exiting...");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    if let Err(e) = run(matches).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
