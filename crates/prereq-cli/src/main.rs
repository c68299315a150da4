//! `sol-prereq`: secret-key conversion and devnet prerequisite tasks.
//!
//! With no subcommand it runs the interactive key converter.

mod commands;
mod config;
mod convert;
mod logging;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chain_sol::{address_to_bytes, AnchorProgram, LAMPORTS_PER_SOL, PREREQ_PROGRAM_ADDRESS};
use clap::{Parser, Subcommand};
use config::{Config, GlobalArgs};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Solana devnet prerequisite tools.
#[derive(Parser)]
#[command(name = "sol-prereq", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a secret key between base58 and a wallet byte array (interactive).
    Convert,
    /// Generate a new keypair.
    Keygen {
        /// Write the wallet file here instead of printing the byte array.
        #[arg(long)]
        outfile: Option<PathBuf>,
    },
    /// Request devnet SOL for the configured wallet.
    Airdrop {
        /// Amount in SOL.
        #[arg(long, default_value_t = 2.0)]
        amount: f64,
    },
    /// Send a fixed amount from the configured wallet.
    Transfer {
        /// Recipient address.
        #[arg(long, value_parser = parse_pubkey)]
        to: [u8; 32],
        #[arg(long, default_value_t = LAMPORTS_PER_SOL / 10)]
        lamports: u64,
    },
    /// Send the configured wallet's whole balance, less the fee.
    Empty {
        /// Recipient address.
        #[arg(long, value_parser = parse_pubkey)]
        to: [u8; 32],
    },
    /// Enroll with the prerequisite program (one-time).
    Enroll {
        /// GitHub handle recorded on-chain.
        #[arg(long)]
        github: String,
        #[arg(long, default_value = PREREQ_PROGRAM_ADDRESS, value_parser = parse_pubkey)]
        program_id: [u8; 32],
    },
}

fn parse_pubkey(s: &str) -> Result<[u8; 32], String> {
    address_to_bytes(s).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let config = Config::from(cli.global);
    let command = cli.command.unwrap_or(Commands::Convert);

    match dispatch(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands, config: &Config) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Convert => {
            let mut stdin = io::stdin().lock();
            convert::run(&mut stdin, &mut stdout)?;
        }
        Commands::Keygen { outfile } => {
            commands::keygen(outfile.as_deref(), &mut stdout)?;
        }
        Commands::Airdrop { amount } => {
            let lamports = commands::sol_to_lamports(amount)?;
            let keypair = config.load_keypair()?;
            let client = config.rpc_client()?;
            let signature = commands::airdrop(&client, &keypair.pubkey(), lamports)?;
            print_success(config, &signature);
        }
        Commands::Transfer { to, lamports } => {
            let keypair = config.load_keypair()?;
            let client = config.rpc_client()?;
            let signature = commands::transfer(&client, &keypair, &to, lamports)?;
            print_success(config, &signature);
        }
        Commands::Empty { to } => {
            let keypair = config.load_keypair()?;
            let client = config.rpc_client()?;
            let (signature, amount) = commands::empty_wallet(&client, &keypair, &to)?;
            println!("Sent {amount} lamports.");
            print_success(config, &signature);
        }
        Commands::Enroll { github, program_id } => {
            let keypair = config.load_keypair()?;
            let client = config.rpc_client()?;
            let program = AnchorProgram::new(program_id);
            let signature = commands::enroll(&client, &program, &keypair, &github)?;
            print_success(config, &signature);
        }
    }

    Ok(())
}

fn print_success(config: &Config, signature: &str) {
    println!(
        "Success! Check out your TX here: {}",
        config.explorer_tx_url(signature)
    );
}
