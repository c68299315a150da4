//! Enrollment with the prerequisite program.
//!
//! Enrollment is a single call to the program's `complete` method, recording
//! the caller's GitHub handle in an account derived from `["prereq", signer]`.
//! The account can only be created once per signer, so enrollment is one-time
//! by construction.

use tracing::debug;

use crate::address::bytes_to_address;
use crate::error::SolError;
use crate::program::ProgramInvoker;
use crate::transaction::{compile_transaction, SolAccountMeta, SolInstruction, SolTransaction, SYSTEM_PROGRAM_ID};

/// Default program id of the prerequisite program on devnet.
pub const PREREQ_PROGRAM_ADDRESS: &str = "WBAQSygkwMox2VuWKU133NxFrpDZUBdvSBeaBEue2Jq";

/// Raw bytes of [`PREREQ_PROGRAM_ADDRESS`].
pub const PREREQ_PROGRAM_ID: [u8; 32] = [
    0x07, 0x79, 0x55, 0x76, 0x2d, 0x9d, 0x70, 0xbf, 0xc3, 0x04, 0xe3, 0x09, 0x81, 0xf2, 0x3b,
    0xac, 0x61, 0x3f, 0x0b, 0x82, 0xb5, 0x27, 0x83, 0x4f, 0x13, 0x6b, 0xb2, 0xb5, 0x1d, 0x10,
    0x27, 0x56,
];

const ENROLLMENT_SEED: &[u8] = b"prereq";
const COMPLETE_METHOD: &str = "complete";

/// The enrollment account owned by the program for `signer`.
pub fn enrollment_address(program: &impl ProgramInvoker, signer: &[u8; 32]) -> Result<[u8; 32], SolError> {
    program
        .find_address(&[ENROLLMENT_SEED, signer])
        .map(|(address, _bump)| address)
}

/// Build the `complete(github)` instruction.
///
/// Accounts: signer (signer, writable), enrollment account (writable),
/// system program. The argument is a length-prefixed byte string
/// (u32 LE length, then the bytes).
pub fn complete_instruction(
    program: &impl ProgramInvoker,
    signer: &[u8; 32],
    github: &[u8],
) -> Result<SolInstruction, SolError> {
    if github.is_empty() {
        return Err(SolError::TransactionBuildError(
            "github handle must not be empty".into(),
        ));
    }
    let len = u32::try_from(github.len()).map_err(|_| {
        SolError::TransactionBuildError("github handle too long".into())
    })?;

    let enrollment = enrollment_address(program, signer)?;
    debug!(enrollment = %bytes_to_address(&enrollment), "derived enrollment account");

    let mut args = Vec::with_capacity(4 + github.len());
    args.extend_from_slice(&len.to_le_bytes());
    args.extend_from_slice(github);

    Ok(program.instruction(
        COMPLETE_METHOD,
        vec![
            SolAccountMeta::signer(*signer),
            SolAccountMeta::writable(enrollment),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID),
        ],
        &args,
    ))
}

/// Build the unsigned enrollment transaction, paid for by `signer`.
pub fn build_enrollment(
    program: &impl ProgramInvoker,
    signer: &[u8; 32],
    github: &[u8],
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    let instruction = complete_instruction(program, signer, github)?;
    compile_transaction(&[instruction], signer, recent_blockhash)
}
