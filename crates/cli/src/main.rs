//! JustPremium adapter CLI.
//!
//! This tool provides commands for:
//! - Validating configuration files
//! - Printing the bid request built for a set of slots
//! - Interpreting a saved endpoint response
//! - Sending a live bid request and printing the matched bids

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use justpremium_adapter_common::auction::find_adapter;
use justpremium_adapter_common::constants::BIDDER_CODE;
use justpremium_adapter_common::logging::{init_logging, parse_level};

mod auction;
mod config;
mod error;

use auction::PageOverride;
use error::CliError;

#[derive(Parser)]
#[command(name = "jpcli")]
#[command(about = "JustPremium bidder adapter CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration file (defaults to the embedded config)
    #[arg(long, short, global = true, env = "JUSTPREMIUM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the bid request built for an input file
    Request {
        /// Auction input JSON (page, window, slots)
        #[arg(long, short, visible_short_alias = 'f')]
        slots: PathBuf,

        #[command(flatten)]
        page: PageOverride,
    },

    /// Interpret a saved endpoint response against an input file
    Interpret {
        /// Auction input JSON (page, window, slots)
        #[arg(long, short)]
        slots: PathBuf,

        /// Endpoint response JSON
        #[arg(long, short)]
        response: PathBuf,

        #[command(flatten)]
        page: PageOverride,
    },

    /// Send the bid request to the endpoint and print matched bids
    Send {
        /// Auction input JSON (page, window, slots)
        #[arg(long, short)]
        slots: PathBuf,

        #[command(flatten)]
        page: PageOverride,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config against settings validation
    Validate {
        /// Path to the TOML configuration file
        #[arg(long, short)]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Validate { file } => config::validate(file, cli.verbose),
        },
        command => run_auction(command, cli.config.as_deref(), cli.verbose),
    }
}

fn run_auction(
    command: Commands,
    config_path: Option<&Path>,
    verbose: bool,
) -> Result<(), CliError> {
    let settings = config::load_settings(config_path, verbose)?;
    let configured = parse_level(&settings.logging.level);
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        configured.unwrap_or(log::LevelFilter::Info)
    };
    init_logging(level)?;
    if configured.is_none() {
        log::warn!(
            "Unknown log level '{}', falling back to info",
            settings.logging.level
        );
    }

    let adapter = find_adapter(&settings, BIDDER_CODE)
        .ok_or_else(|| CliError::Config(format!("Adapter '{}' is disabled", BIDDER_CODE)))?;

    match command {
        Commands::Request { slots, page } => auction::request(adapter.as_ref(), &slots, &page),
        Commands::Interpret {
            slots,
            response,
            page,
        } => auction::interpret(adapter.as_ref(), &slots, &response, &page),
        Commands::Send { slots, page } => {
            auction::send(adapter.as_ref(), &slots, &page, verbose)
        }
        Commands::Config { .. } => Ok(()),
    }
}
