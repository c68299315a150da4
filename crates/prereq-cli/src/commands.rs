//! Network commands: airdrop, transfer, sweep and enrollment, plus keygen.
//!
//! Each command is one linear round-trip through a [`TransactionSubmitter`]
//! and returns the transaction signature. No retries: the first failure ends
//! the command.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use chain_sol::{
    build_enrollment, build_sol_transfer, bytes_to_address, serialize_message, sign_transaction,
    write_keypair_file, Keypair, ProgramInvoker, LAMPORTS_PER_SOL,
};
use key_codec::format_byte_array;
use sol_rpc::TransactionSubmitter;
use tracing::info;

/// Generate a keypair and print it, or save it when `outfile` is given.
pub fn keygen(outfile: Option<&Path>, out: &mut impl Write) -> Result<Keypair> {
    let keypair = Keypair::generate();
    writeln!(out, "You've generated a new Solana wallet: {}", keypair.address())?;

    match outfile {
        Some(path) => {
            write_keypair_file(&keypair, path)?;
            writeln!(out, "Saved wallet file to {}", path.display())?;
        }
        None => {
            writeln!(out)?;
            writeln!(out, "To save your wallet, copy and paste the following into a JSON file:")?;
            writeln!(out, "{}", format_byte_array(&keypair.to_bytes()))?;
        }
    }

    Ok(keypair)
}

/// Convert a SOL amount to lamports.
pub fn sol_to_lamports(sol: f64) -> Result<u64> {
    ensure!(sol.is_finite() && sol > 0.0, "amount must be a positive number of SOL");
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    ensure!(lamports >= 1.0 && lamports <= u64::MAX as f64, "amount {sol} SOL is out of range");
    Ok(lamports as u64)
}

pub fn airdrop(submitter: &impl TransactionSubmitter, to: &[u8; 32], lamports: u64) -> Result<String> {
    info!(to = %bytes_to_address(to), lamports, "requesting airdrop");
    let signature = submitter
        .request_airdrop(to, lamports)
        .context("airdrop request failed")?;
    submitter.confirm_transaction(&signature)?;
    Ok(signature)
}

/// Send a fixed amount from `from` to `to`.
pub fn transfer(
    submitter: &impl TransactionSubmitter,
    from: &Keypair,
    to: &[u8; 32],
    lamports: u64,
) -> Result<String> {
    info!(from = %from.address(), to = %bytes_to_address(to), lamports, "transferring");
    let blockhash = submitter
        .latest_blockhash()
        .context("failed to get recent blockhash")?;

    let tx = build_sol_transfer(&from.pubkey(), to, lamports, &blockhash)?;
    let wire = sign_transaction(&tx, from)?;
    Ok(submitter.send_and_confirm(&wire)?)
}

/// Move the whole balance of `from` to `to`, less the transaction fee.
///
/// Returns the signature and the amount moved.
pub fn empty_wallet(
    submitter: &impl TransactionSubmitter,
    from: &Keypair,
    to: &[u8; 32],
) -> Result<(String, u64)> {
    let balance = submitter
        .balance(&from.pubkey())
        .context("failed to get balance")?;
    if balance == 0 {
        bail!("wallet {} is already empty", from.address());
    }

    let blockhash = submitter
        .latest_blockhash()
        .context("failed to get recent blockhash")?;

    // The fee does not depend on the amount, so price the full-balance message.
    let probe = build_sol_transfer(&from.pubkey(), to, balance, &blockhash)?;
    let fee = submitter
        .fee_for_message(&serialize_message(&probe)?)
        .context("failed to get fee")?;
    if balance <= fee {
        bail!("balance of {balance} lamports does not cover the {fee} lamport fee");
    }

    let amount = balance - fee;
    info!(from = %from.address(), to = %bytes_to_address(to), amount, fee, "emptying wallet");

    let tx = build_sol_transfer(&from.pubkey(), to, amount, &blockhash)?;
    let wire = sign_transaction(&tx, from)?;
    Ok((submitter.send_and_confirm(&wire)?, amount))
}

/// Submit the one-time enrollment with `github` as the recorded handle.
pub fn enroll(
    submitter: &impl TransactionSubmitter,
    program: &impl ProgramInvoker,
    signer: &Keypair,
    github: &str,
) -> Result<String> {
    let github = github.trim();
    info!(signer = %signer.address(), github, "enrolling");

    let blockhash = submitter
        .latest_blockhash()
        .context("failed to get recent blockhash")?;
    let tx = build_enrollment(program, &signer.pubkey(), github.as_bytes(), &blockhash)?;
    let wire = sign_transaction(&tx, signer)?;
    Ok(submitter.send_and_confirm(&wire)?)
}
