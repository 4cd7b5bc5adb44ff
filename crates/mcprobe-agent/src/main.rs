//! mcprobe command line

use clap::{Parser, Subcommand};
use mcprobe_agent::{Agent, Config, Item, PingItem, Requirement, StatusItem};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Query memcached instances for a monitoring collector
#[derive(Parser, Debug)]
#[command(name = "mcprobe")]
#[command(version)]
#[command(about = "Discover and query memcached instances", long_about = None)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-step timeout (e.g. 500ms, 2s); overrides the configuration
    #[arg(short, long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the discovery JSON for the configured instances
    Discovery {
        /// Instance list to use instead of `memcached_inst_ports`
        #[arg(long)]
        ports: Option<String>,
    },

    /// Print one statistic: `[host] port key`
    Status {
        #[arg(num_args = 0..)]
        params: Vec<String>,
    },

    /// Print 1 if the instance stores and returns a value, 0 otherwise: `[host] port`
    Ping {
        #[arg(num_args = 0..)]
        params: Vec<String>,
    },

    /// Evaluate a full item key, e.g. `memcached.status[11211,uptime]`
    Get { key: String },
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let requirement = match &cli.command {
        Command::Discovery { ports: None } => Requirement::Required,
        Command::Get { key } if key.trim().starts_with(mcprobe_agent::item::DISCOVERY_KEY) => {
            Requirement::Required
        }
        _ => Requirement::Optional,
    };

    let mut config = Config::load(cli.config.as_deref(), requirement)?;

    common::logging::init_with_level(
        config.logging.level(),
        config.logging.is_json(),
    );

    if let Some(timeout) = cli.timeout {
        config.probe.timeout = timeout;
    }

    let item = match cli.command {
        Command::Discovery { ports } => {
            if let Some(ports) = ports {
                config.memcached_inst_ports = Some(ports);
            }
            Ok(Item::Discovery)
        }
        Command::Status { params } => StatusItem::from_params(params.as_slice()).map(Item::Status),
        Command::Ping { params } => PingItem::from_params(params.as_slice()).map(Item::Ping),
        Command::Get { key } => Item::parse(&key),
    };

    let agent = Agent::new(config);
    let result = match item {
        Ok(item) => agent.handle(&item).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(value) => {
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
