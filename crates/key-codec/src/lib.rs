//! # key-codec
//!
//! Conversion between the two textual forms of a Solana secret key: the
//! compact Base58 string printed by browser wallets, and the explicit byte
//! array stored in wallet files (`[174, 47, 154, ...]`).
//!
//! Every operation is a pure function. Decoded key material is returned in
//! [`SecretBytes`] / [`ZeroizingString`] so it is wiped when dropped.

pub mod codec;
pub mod error;
pub mod secret;

pub use codec::{decode, encode, format_byte_array, parse_byte_array_text, SECRET_KEY_LEN};
pub use error::KeyCodecError;
pub use secret::{SecretBytes, ZeroizingString};
