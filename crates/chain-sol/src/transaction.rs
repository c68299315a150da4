//! Solana transaction wire format and signing.
//!
//! Transactions are built by hand. Only the single-signer legacy format is
//! produced, which covers both the native transfer and the enrollment call:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use tracing::debug;

use crate::error::SolError;
use crate::keypair::Keypair;

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// Size of an Ed25519 signature slot.
const SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from the front of a byte slice.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;

    for (i, &byte) in data.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return u16::try_from(value)
                .map(|v| (v, i + 1))
                .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()));
        }
    }

    Err(SolError::SerializationError(
        "unexpected end of data while decoding compact-u16".into(),
    ))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn signer(pubkey: [u8; 32]) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: true,
        }
    }

    pub fn writable(pubkey: [u8; 32]) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32]) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: false,
        }
    }
}

/// An instruction before it is compiled into a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled, unsigned transaction.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,

    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// An instruction whose account references are indices into the
/// transaction's `account_keys`.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Build a native SOL transfer of `lamports` from `from_pubkey` to `to_pubkey`.
///
/// The sender pays the fee. The caller supplies a recent blockhash from RPC.
pub fn build_sol_transfer(
    from_pubkey: &[u8; 32],
    to_pubkey: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuildError(
            "lamports must be > 0".into(),
        ));
    }

    let instruction = system_transfer_instruction(from_pubkey, to_pubkey, lamports);
    compile_transaction(&[instruction], from_pubkey, recent_blockhash)
}

/// Compile instructions into a transaction with a single fee payer.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction has no instructions".into(),
        ));
    }

    struct AccountEntry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();
    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    // Fee payer is always signer + writable.
    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    // sort_by_key is stable: the fee payer, inserted first with rank 0,
    // stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();
    let index_of = |key: &[u8; 32]| account_keys.iter().position(|k| k == key).map(|i| i as u8);

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id).ok_or_else(|| {
            SolError::TransactionBuildError("program_id not in account keys".into())
        })?;

        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| {
                index_of(&meta.pubkey).ok_or_else(|| {
                    SolError::TransactionBuildError("account not in account keys".into())
                })
            })
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
///
/// These are also the bytes `getFeeForMessage` expects.
pub fn serialize_message(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let compact_len = |len: usize| {
        u16::try_from(len)
            .map(encode_compact_u16)
            .map_err(|_| SolError::SerializationError(format!("length {len} exceeds u16")))
    };

    let mut buf = Vec::with_capacity(256);

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&compact_len(tx.account_keys.len())?);
    for key in &tx.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&compact_len(tx.compiled_instructions.len())?);
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&compact_len(ix.account_indices.len())?);
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&compact_len(ix.data.len())?);
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

/// Sign a single-signer transaction and serialize it to wire format.
///
/// The signer must be the fee payer and the only required signature.
pub fn sign_transaction(tx: &SolTransaction, signer: &Keypair) -> Result<Vec<u8>, SolError> {
    let pubkey = signer.pubkey();
    if tx.account_keys.first() != Some(&pubkey) {
        return Err(SolError::SigningError(
            "signer is not the fee payer".into(),
        ));
    }
    if tx.num_required_signatures != 1 {
        return Err(SolError::SigningError(format!(
            "transaction requires {} signatures, only one signer available",
            tx.num_required_signatures
        )));
    }

    let message_bytes = serialize_message(tx)?;
    let signature = signer.sign(&message_bytes);

    let mut wire = Vec::with_capacity(1 + SIGNATURE_LEN + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&message_bytes);

    debug!(
        fee_payer = %signer.address(),
        size = wire.len(),
        "signed transaction"
    );
    Ok(wire)
}

/// The transaction id: Base58 of the first signature in a wire transaction.
pub fn transaction_signature(wire: &[u8]) -> Result<String, SolError> {
    let (num_sigs, offset) = decode_compact_u16(wire)?;
    if num_sigs == 0 {
        return Err(SolError::SerializationError(
            "transaction has zero signatures".into(),
        ));
    }

    let sig = wire.get(offset..offset + SIGNATURE_LEN).ok_or_else(|| {
        SolError::SerializationError("transaction too short for its signature".into())
    })?;

    Ok(bs58::encode(sig).into_string())
}

/// Build a System Program `Transfer` instruction.
pub fn system_transfer_instruction(from: &[u8; 32], to: &[u8; 32], lamports: u64) -> SolInstruction {
    // u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![SolAccountMeta::signer(*from), SolAccountMeta::writable(*to)],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, VerifyingKey};

    fn test_keypair(fill: u8) -> Keypair {
        let seed = [fill; 32];
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
        Keypair::from_secret_bytes(&signing_key.to_keypair_bytes()).unwrap()
    }

    // -- compact-u16 --------------------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(16383), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn decode_compact_u16_values() {
        for value in [0u16, 1, 127, 128, 255, 256, 16383, 16384, 65535] {
            let encoded = encode_compact_u16(value);
            let (decoded, len) = decode_compact_u16(&encoded).unwrap();
            assert_eq!(decoded, value, "failed for {value}");
            assert_eq!(len, encoded.len());
        }
    }

    #[test]
    fn decode_compact_u16_ignores_trailing_bytes() {
        assert_eq!(decode_compact_u16(&[0x01, 0xAA, 0xBB]).unwrap(), (1, 1));
    }

    #[test]
    fn decode_compact_u16_truncated_fails() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
    }

    #[test]
    fn decode_compact_u16_overflow_fails() {
        let err = decode_compact_u16(&[0xff, 0xff, 0x7f]).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    // -- transfer -----------------------------------------------------------

    #[test]
    fn transfer_instruction_data() {
        let ix = system_transfer_instruction(&[1u8; 32], &[2u8; 32], LAMPORTS_PER_SOL / 10);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &100_000_000u64.to_le_bytes());
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn transfer_instruction_accounts() {
        let from = [0xAAu8; 32];
        let to = [0xBBu8; 32];
        let ix = system_transfer_instruction(&from, &to, 500);
        assert_eq!(
            ix.accounts,
            vec![SolAccountMeta::signer(from), SolAccountMeta::writable(to)]
        );
    }

    #[test]
    fn zero_lamports_fails() {
        let result = build_sol_transfer(&[1u8; 32], &[2u8; 32], 0, &[0u8; 32]);
        assert!(result.is_err());
    }

    // -- compilation ---------------------------------------------------------

    #[test]
    fn compiled_transfer_account_order() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let tx = build_sol_transfer(&from, &to, 1000, &[0xAA; 32]).unwrap();

        assert_eq!(tx.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(tx.num_required_signatures, 1);
        assert_eq!(tx.num_readonly_signed, 0);
        assert_eq!(tx.num_readonly_unsigned, 1);
        assert_eq!(tx.recent_blockhash, [0xAA; 32]);

        let cix = &tx.compiled_instructions[0];
        assert_eq!(cix.program_id_index, 2);
        assert_eq!(cix.account_indices, vec![0, 1]);
    }

    #[test]
    fn fee_payer_first_even_when_listed_later() {
        let payer = [9u8; 32];
        let other_signer = [1u8; 32];
        let ix = SolInstruction {
            program_id: [7u8; 32],
            accounts: vec![SolAccountMeta::signer(other_signer), SolAccountMeta::signer(payer)],
            data: vec![],
        };
        let tx = compile_transaction(&[ix], &payer, &[0u8; 32]).unwrap();
        assert_eq!(tx.account_keys[0], payer);
        assert_eq!(tx.num_required_signatures, 2);
    }

    #[test]
    fn self_transfer_deduplicates_accounts() {
        let key = [0xAAu8; 32];
        let tx = build_sol_transfer(&key, &key, 100, &[0u8; 32]).unwrap();
        assert_eq!(tx.account_keys.len(), 2);
        assert_eq!(tx.compiled_instructions[0].account_indices, vec![0, 0]);
    }

    #[test]
    fn empty_instruction_list_fails() {
        assert!(compile_transaction(&[], &[1u8; 32], &[0u8; 32]).is_err());
    }

    #[test]
    fn message_layout() {
        let tx = build_sol_transfer(&[1u8; 32], &[2u8; 32], 500, &[0xCC; 32]).unwrap();
        let msg = serialize_message(&tx).unwrap();

        assert_eq!(&msg[..3], &[1, 0, 1]);
        assert_eq!(msg[3], 3); // three account keys
        let blockhash_at = 4 + 3 * 32;
        assert_eq!(&msg[blockhash_at..blockhash_at + 32], &[0xCC; 32]);
        // one instruction: program idx, 2 accounts, 12 data bytes
        assert_eq!(&msg[blockhash_at + 32..blockhash_at + 37], &[1, 2, 2, 0, 1]);
        assert_eq!(msg.len(), blockhash_at + 32 + 5 + 1 + 12);
    }

    // -- signing -------------------------------------------------------------

    #[test]
    fn signed_transfer_verifies() {
        let kp = test_keypair(0x42);
        let tx = build_sol_transfer(&kp.pubkey(), &[0xBB; 32], 1_000_000, &[0xCC; 32]).unwrap();
        let wire = sign_transaction(&tx, &kp).unwrap();

        assert_eq!(wire[0], 0x01);
        let sig_bytes: [u8; 64] = wire[1..65].try_into().unwrap();
        let vk = VerifyingKey::from_bytes(&kp.pubkey()).unwrap();
        assert!(vk
            .verify_strict(&wire[65..], &Signature::from_bytes(&sig_bytes))
            .is_ok());
        assert_eq!(&wire[65..], &serialize_message(&tx).unwrap()[..]);
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = test_keypair(0x55);
        let tx = build_sol_transfer(&kp.pubkey(), &[0x77; 32], 42, &[0x99; 32]).unwrap();
        assert_eq!(sign_transaction(&tx, &kp).unwrap(), sign_transaction(&tx, &kp).unwrap());
    }

    #[test]
    fn signing_with_non_payer_fails() {
        let payer = test_keypair(0x11);
        let stranger = test_keypair(0x22);
        let tx = build_sol_transfer(&payer.pubkey(), &[0xBB; 32], 1000, &[0xCC; 32]).unwrap();

        let err = sign_transaction(&tx, &stranger).unwrap_err();
        assert!(err.to_string().contains("not the fee payer"));
    }

    #[test]
    fn signing_multi_signer_transaction_fails() {
        let kp = test_keypair(0x33);
        let ix = SolInstruction {
            program_id: [7u8; 32],
            accounts: vec![SolAccountMeta::signer([5u8; 32])],
            data: vec![],
        };
        let tx = compile_transaction(&[ix], &kp.pubkey(), &[0u8; 32]).unwrap();
        assert!(sign_transaction(&tx, &kp).is_err());
    }

    #[test]
    fn transaction_signature_is_first_signature() {
        let kp = test_keypair(0x42);
        let tx = build_sol_transfer(&kp.pubkey(), &[0xBB; 32], 10, &[0xCC; 32]).unwrap();
        let wire = sign_transaction(&tx, &kp).unwrap();

        let id = transaction_signature(&wire).unwrap();
        assert_eq!(bs58::decode(&id).into_vec().unwrap(), wire[1..65].to_vec());
    }

    #[test]
    fn transaction_signature_rejects_bad_wire() {
        assert!(transaction_signature(&[]).is_err());
        assert!(transaction_signature(&[0x00, 0x01]).is_err());
        assert!(transaction_signature(&[0x01, 0xAA]).is_err());
    }
}
