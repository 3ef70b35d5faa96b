//! Ticketseed operator CLI.
//!
//! # Usage
//!
//! ```bash
//! # Validate a seed file before pushing it to the fleet
//! ticketseed check --seeds seeds.json
//!
//! # Show the public key name of every configured seed
//! ticketseed names --seeds seeds.json
//!
//! # Seal and open a ticket with the configured keys
//! ticketseed seal --seeds seeds.json --data "session state"
//! ticketseed open --seeds seeds.json --ticket 1a2b...
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ticketseed_server::{CliError, SystemEnv, commands, load_seed_file};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// TLS session-ticket seed tool
#[derive(Parser, Debug)]
#[command(name = "ticketseed")]
#[command(about = "Inspect and exercise TLS session-ticket seed files")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a seed file and print seed counts
    Check {
        /// Path to the JSON seed file
        #[arg(short, long)]
        seeds: PathBuf,
    },
    /// Print the classification and key name of every configured seed
    Names {
        /// Path to the JSON seed file
        #[arg(short, long)]
        seeds: PathBuf,
    },
    /// Seal data into a hex ticket under the current key
    Seal {
        /// Path to the JSON seed file
        #[arg(short, long)]
        seeds: PathBuf,

        /// Session state to seal
        #[arg(short, long)]
        data: String,
    },
    /// Open a hex ticket and report whether renewal is advised
    Open {
        /// Path to the JSON seed file
        #[arg(short, long)]
        seeds: PathBuf,

        /// Hex-encoded ticket
        #[arg(short, long)]
        ticket: String,
    },
}

#[allow(clippy::print_stdout)]
fn run(command: Command) -> Result<(), CliError> {
    let env = SystemEnv::new();

    match command {
        Command::Check { seeds } => {
            let report = commands::check(env, &load_seed_file(&seeds)?)?;
            println!("{report}");
        },
        Command::Names { seeds } => {
            for named in commands::names(env, &load_seed_file(&seeds)?)? {
                println!("{named}");
            }
        },
        Command::Seal { seeds, data } => {
            let ticket = commands::seal(env, &load_seed_file(&seeds)?, data.as_bytes())?;
            println!("{ticket}");
        },
        Command::Open { seeds, ticket } => {
            let opened = commands::open(env, &load_seed_file(&seeds)?, &ticket)?;
            println!("{}", String::from_utf8_lossy(&opened.state));
            if opened.renew {
                println!("renew: ticket key is retiring");
            }
        },
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    run(args.command)?;

    Ok(())
}
