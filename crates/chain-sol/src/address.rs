//! Solana address parsing and display.
//!
//! An address is the Base58 encoding of a raw 32-byte Ed25519 public key (or
//! of a program-derived address, which is off the curve). There is no
//! hashing step and no checksum.

use crate::error::SolError;

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Solana address string to its 32-byte representation.
///
/// Surrounding whitespace is ignored so pasted addresses work as-is.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Validate a Solana address string.
pub fn validate_address(address: &str) -> Result<bool, SolError> {
    address_to_bytes(address).map(|_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_address() {
        let zeros = [0u8; 32];
        assert_eq!(bytes_to_address(&zeros), "11111111111111111111111111111111");
    }

    #[test]
    fn recipient_address_decodes() {
        let bytes = address_to_bytes("GLtaTaYiTQrgz411iPJD79rsoee59HhEy18rtRdrhEUJ").unwrap();
        assert_eq!(&bytes[..4], &[227, 247, 168, 76]);
        assert_eq!(
            bytes_to_address(&bytes),
            "GLtaTaYiTQrgz411iPJD79rsoee59HhEy18rtRdrhEUJ"
        );
    }

    #[test]
    fn pasted_address_with_whitespace() {
        let bytes = address_to_bytes("  11111111111111111111111111111111\n").unwrap();
        assert_eq!(bytes, [0u8; 32]);
    }

    #[test]
    fn validate_garbage_returns_error() {
        assert!(validate_address("not-a-valid-address!!!").is_err());
    }

    #[test]
    fn validate_too_short_returns_error() {
        // "1" decodes to a single zero byte, which is not 32 bytes.
        let err = validate_address("1").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes, got 1"));
    }

    #[test]
    fn secret_key_is_not_an_address() {
        let secret = "49W385L4rePHy6PAaQUovbD2aacgN4HsKXSMeUzRg4fmwXszN91JuMFrQRj3vMDpZuRF3ZknQBuRBoWQJEfXstMw";
        let err = address_to_bytes(secret).unwrap_err();
        assert!(err.to_string().contains("got 64"));
    }
}
