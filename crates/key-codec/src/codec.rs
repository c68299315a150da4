//! Base58 <-> byte-array conversion for secret keys.
//!
//! Base58 here is the Bitcoin alphabet used by Solana
//! (`123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz`). The string
//! is a big-endian base-58 numeral; every leading `'1'` stands for one leading
//! zero byte, which the numeral itself would otherwise drop. The arithmetic is
//! done by the `bs58` crate; this module fixes the error reporting and the
//! text form of the byte array.

use zeroize::Zeroizing;

use crate::error::KeyCodecError;
use crate::secret::{SecretBytes, ZeroizingString};

/// Length of a Solana wallet secret: 32-byte seed + 32-byte public key.
pub const SECRET_KEY_LEN: usize = 64;

/// Decode a Base58 string into its bytes.
///
/// The empty string decodes to an empty sequence. Whitespace is not part of
/// the alphabet; callers reading user input should trim it first.
pub fn decode(text: &str) -> Result<SecretBytes, KeyCodecError> {
    bs58::decode(text)
        .into_vec()
        .map(SecretBytes::new)
        .map_err(|e| KeyCodecError::InvalidEncoding(describe_decode_error(e)))
}

/// Encode bytes as a Base58 string. Never fails.
///
/// An input of `n` zero bytes encodes to `n` `'1'` characters.
pub fn encode(bytes: &[u8]) -> ZeroizingString {
    ZeroizingString::new(bs58::encode(bytes).into_string())
}

/// Parse the comma-separated decimal form of a byte array.
///
/// Accepts `1, 2, 3` as well as the bracketed `[1, 2, 3]` printed by
/// [`format_byte_array`] and stored in wallet files. Each value must be a
/// base-10 integer in `0..=255`; empty values (`1,,3`) and empty lists are
/// rejected rather than skipped.
pub fn parse_byte_array_text(input: &str) -> Result<SecretBytes, KeyCodecError> {
    let trimmed = input.trim();
    let inner = match trimmed.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(|| {
            KeyCodecError::InvalidByteArray("missing closing ']'".into())
        })?,
        None => trimmed,
    };

    if inner.trim().is_empty() {
        return Err(KeyCodecError::InvalidByteArray("empty byte list".into()));
    }

    let mut bytes = Zeroizing::new(Vec::with_capacity(SECRET_KEY_LEN));
    for (position, token) in inner.split(',').enumerate() {
        bytes.push(parse_byte(token.trim(), position)?);
    }

    Ok(SecretBytes::new(std::mem::take(&mut *bytes)))
}

/// Render bytes as the array text printed to the user: `[1, 2, 3]`.
pub fn format_byte_array(bytes: &[u8]) -> ZeroizingString {
    ZeroizingString::new(format!("{:?}", bytes))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_byte(token: &str, position: usize) -> Result<u8, KeyCodecError> {
    if token.is_empty() {
        return Err(KeyCodecError::InvalidByteArray(format!(
            "missing value at position {position}"
        )));
    }

    let (negative, digits) = match token.as_bytes()[0] {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyCodecError::InvalidByteArray(format!(
            "value at position {position} is not a base-10 integer: {token:?}"
        )));
    }

    let out_of_range = || {
        KeyCodecError::InvalidByteArray(format!(
            "value at position {position} is out of range 0..=255: {token}"
        ))
    };

    // "-0" is still zero.
    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(out_of_range());
    }

    digits.parse::<u8>().map_err(|_| out_of_range())
}

fn describe_decode_error(err: bs58::decode::Error) -> String {
    match err {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            format!("character {character:?} at index {index} is not in the base58 alphabet")
        }
        bs58::decode::Error::NonAsciiCharacter { index } => {
            format!("non-ASCII character at index {index}")
        }
        other => other.to_string(),
    }
}
