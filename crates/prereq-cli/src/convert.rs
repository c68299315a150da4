//! Interactive secret-key converter.
//!
//! Asks which direction to convert, reads one key, prints the other form.
//! Input and output are injected so the whole dialogue can be driven from
//! memory in tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use key_codec::{decode, encode, format_byte_array, parse_byte_array_text, SECRET_KEY_LEN};
use tracing::warn;
use zeroize::Zeroizing;

const MENU: &str = "Select conversion:\n  1) base58 -> wallet array\n  2) wallet array -> base58\n> ";
const BASE58_PROMPT: &str = "Enter your base58-encoded private key: ";
const ARRAY_PROMPT: &str = "Enter your wallet byte array (comma-separated numbers):\n";
const INVALID_CHOICE: &str = "Invalid choice. Exiting.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    InvalidChoice,
}

pub fn run<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Outcome> {
    let choice = prompt(input, output, MENU)?;

    match choice.trim() {
        "1" => base58_to_wallet(input, output)?,
        "2" => wallet_to_base58(input, output)?,
        _ => {
            writeln!(output, "{INVALID_CHOICE}")?;
            return Ok(Outcome::InvalidChoice);
        }
    }

    Ok(Outcome::Converted)
}

fn base58_to_wallet<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let line = prompt(input, output, BASE58_PROMPT)?;
    let bytes = decode(line.trim())?;
    warn_on_length(bytes.len());

    writeln!(output, "Your wallet array is:\n{}", format_byte_array(&bytes))?;
    Ok(())
}

fn wallet_to_base58<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let line = prompt(input, output, ARRAY_PROMPT)?;
    let bytes = parse_byte_array_text(&line)?;
    warn_on_length(bytes.len());

    writeln!(output, "Your base58 private key is:\n{}", encode(&bytes))?;
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Zeroizing<String>> {
    output.write_all(text.as_bytes())?;
    output.flush()?;

    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line).context("couldn't read input")?;
    Ok(line)
}

fn warn_on_length(len: usize) {
    if len != SECRET_KEY_LEN {
        warn!(len, expected = SECRET_KEY_LEN, "converted key is not a full wallet secret");
    }
}
