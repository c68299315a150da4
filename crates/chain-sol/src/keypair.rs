//! Ed25519 keypairs and Solana wallet files.
//!
//! A wallet file is a JSON array of the 64 secret-key bytes, seed first and
//! public key second, exactly what `solana-keygen` writes. The same 64 bytes
//! are what the Key Codec converts to and from Base58.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use ed25519_dalek::{Signer, SigningKey};
use key_codec::{SecretBytes, ZeroizingString, SECRET_KEY_LEN};
use rand::rngs::OsRng;
use tracing::debug;
use zeroize::Zeroizing;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// A signing keypair. The secret half is zeroed on drop by `ed25519-dalek`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from the 64-byte wallet secret.
    ///
    /// Fails when the length is wrong or when the trailing 32 bytes are not
    /// the public key of the leading 32-byte seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: &[u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            SolError::InvalidPrivateKey(format!(
                "expected {SECRET_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(arr).map_err(|_| {
            SolError::InvalidPrivateKey("public key does not match secret seed".into())
        })?;

        Ok(Self { signing_key })
    }

    /// Build a keypair from a Base58 secret key as exported by browser wallets.
    pub fn from_base58(text: &str) -> Result<Self, SolError> {
        let bytes = key_codec::decode(text.trim())?;
        Self::from_secret_bytes(&bytes)
    }

    /// The 64-byte wallet secret.
    pub fn to_bytes(&self) -> SecretBytes {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        SecretBytes::from(&bytes[..])
    }

    pub fn to_base58(&self) -> ZeroizingString {
        key_codec::encode(&self.to_bytes())
    }

    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    /// Sign a message, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.address())
            .finish_non_exhaustive()
    }
}

/// Read a keypair from a JSON wallet file.
pub fn read_keypair_file(path: impl AsRef<Path>) -> Result<Keypair, SolError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading wallet file");

    let contents = Zeroizing::new(
        std::fs::read_to_string(path)
            .map_err(|e| SolError::WalletFile(format!("{}: {e}", path.display())))?,
    );

    let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
        serde_json::from_str(&contents)
            .map_err(|e| SolError::WalletFile(format!("{}: {e}", path.display())))?,
    );

    Keypair::from_secret_bytes(&bytes)
}

/// Write a keypair as a JSON wallet file.
///
/// Refuses to overwrite an existing file. On Unix the file is created with
/// mode 0600.
pub fn write_keypair_file(keypair: &Keypair, path: impl AsRef<Path>) -> Result<(), SolError> {
    let path = path.as_ref();
    let bytes = keypair.to_bytes();
    let json = Zeroizing::new(
        serde_json::to_string(&*bytes)
            .map_err(|e| SolError::SerializationError(e.to_string()))?,
    );

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| SolError::WalletFile(format!("{}: {e}", path.display())))?;
    file.write_all(json.as_bytes())
        .map_err(|e| SolError::WalletFile(format!("{}: {e}", path.display())))?;

    debug!(path = %path.display(), pubkey = %keypair.address(), "wrote wallet file");
    Ok(())
}
