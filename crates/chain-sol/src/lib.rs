//! Solana chain support for the devnet prerequisite tools.
//!
//! Keypairs and wallet files, address handling, the transaction wire format,
//! program-derived addresses and the enrollment instruction for the
//! prerequisite program. Transactions are serialized by hand (no
//! `solana-sdk`), using `ed25519-dalek` for signing and `bs58` for addresses.
//! Nothing in this crate touches the network; see `sol-rpc` for that.

pub mod address;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod prereq;
pub mod program;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use error::SolError;
pub use keypair::{read_keypair_file, write_keypair_file, Keypair};
pub use pda::{find_program_address, MAX_SEEDS, MAX_SEED_LEN};
pub use prereq::{
    build_enrollment, complete_instruction, enrollment_address, PREREQ_PROGRAM_ADDRESS,
    PREREQ_PROGRAM_ID,
};
pub use program::{method_discriminator, AnchorProgram, ProgramInvoker};
pub use transaction::{
    build_sol_transfer, compile_transaction, decode_compact_u16, encode_compact_u16,
    serialize_message, sign_transaction, system_transfer_instruction, transaction_signature,
    CompiledInstruction, SolAccountMeta, SolInstruction, SolTransaction, LAMPORTS_PER_SOL,
    SYSTEM_PROGRAM_ID,
};
