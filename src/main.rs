use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use portfolio_trajectory::{api, core::validate_simulation_str, logging};

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-trajectory",
    version,
    about = "Validates Monte Carlo portfolio simulation requests"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Log filter directive; RUST_LOG takes precedence when set"
    )]
    log: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Validate a simulation request stored as JSON and print the normalized
    /// configuration.
    Check { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::log_init(&cli.log.unwrap_or_else(logging::default_filter));

    match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = api::run_http_server(SocketAddr::new(host, port)).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Check { path } => {
            let body = match std::fs::read_to_string(&path) {
                Ok(body) => body,
                Err(e) => {
                    eprintln!("Cannot read {}: {e}", path.display());
                    std::process::exit(1);
                }
            };
            match validate_simulation_str(&body) {
                Ok(config) => println!("{}", json!({ "config": config })),
                Err(errors) => {
                    eprintln!("{}", json!({ "errors": errors }));
                    std::process::exit(1);
                }
            }
        }
    }
}
