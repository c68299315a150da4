//! Calling on-chain programs.
//!
//! [`ProgramInvoker`] is the capability needed to talk to a deployed program:
//! know its id, derive addresses it owns, and build an instruction for one of
//! its methods. [`AnchorProgram`] implements it for programs written with
//! Anchor, whose instruction data starts with an 8-byte method discriminator.

use sha2::{Digest, Sha256};

use crate::address::{address_to_bytes, bytes_to_address};
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction};

/// Anchor's instruction discriminator: `SHA-256("global:" + method)[..8]`.
pub fn method_discriminator(method: &str) -> [u8; 8] {
    let hash = Sha256::new()
        .chain_update(b"global:")
        .chain_update(method.as_bytes())
        .finalize();

    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

pub trait ProgramInvoker {
    fn program_id(&self) -> [u8; 32];

    /// Derive a program-owned address from `seeds`.
    fn find_address(&self, seeds: &[&[u8]]) -> Result<([u8; 32], u8), SolError> {
        find_program_address(seeds, &self.program_id())
    }

    /// Build an instruction invoking `method` with already-serialized `args`.
    fn instruction(&self, method: &str, accounts: Vec<SolAccountMeta>, args: &[u8]) -> SolInstruction;
}

/// An Anchor program addressed by its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorProgram {
    program_id: [u8; 32],
}

impl AnchorProgram {
    pub fn new(program_id: [u8; 32]) -> Self {
        Self { program_id }
    }

    pub fn from_address(address: &str) -> Result<Self, SolError> {
        address_to_bytes(address).map(Self::new)
    }

    pub fn address(&self) -> String {
        bytes_to_address(&self.program_id)
    }
}

impl ProgramInvoker for AnchorProgram {
    fn program_id(&self) -> [u8; 32] {
        self.program_id
    }

    fn instruction(&self, method: &str, accounts: Vec<SolAccountMeta>, args: &[u8]) -> SolInstruction {
        let mut data = Vec::with_capacity(8 + args.len());
        data.extend_from_slice(&method_discriminator(method));
        data.extend_from_slice(args);

        SolInstruction {
            program_id: self.program_id,
            accounts,
            data,
        }
    }
}
