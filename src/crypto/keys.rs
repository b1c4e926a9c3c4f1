//! Store key material
//!
//! The ledger encrypts its transaction store with a 32-byte AES-256 key.
//! The key normally lives in an opaque key file that is generated once and
//! reused on every later open; it can also be derived from a passphrase
//! with Argon2id, a memory-hard KDF resistant to GPU/ASIC attacks.

use std::fs;
use std::path::Path;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, Params,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LedgerError, LedgerResult};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Parameters for passphrase-based key derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt for key derivation (base64 encoded)
    pub salt: String,
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            salt: String::new(), // Generated on first use
            memory_cost: 65536,  // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Create new params with a random salt
    pub fn new() -> Self {
        let salt = SaltString::generate(&mut OsRng);
        Self {
            salt: salt.to_string(),
            ..Default::default()
        }
    }

    /// Create params with specific values
    pub fn with_values(salt: String, memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            salt,
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// A 32-byte store encryption key, zeroed from memory on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct StoreKey {
    key: [u8; KEY_SIZE],
}

impl StoreKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Wrap existing key bytes
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Wrap a byte slice, validating its length
    pub fn from_slice(bytes: &[u8]) -> LedgerResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(LedgerError::Encryption(format!(
                "Invalid key length: expected {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Derive a key from a passphrase with Argon2id
    ///
    /// Deterministic for the same passphrase and params; a different salt
    /// yields a different key.
    pub fn from_passphrase(passphrase: &str, params: &KeyDerivationParams) -> LedgerResult<Self> {
        let salt = SaltString::from_b64(&params.salt)
            .map_err(|e| LedgerError::Encryption(format!("Invalid salt: {}", e)))?;

        let argon2_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| LedgerError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2_params,
        );

        let hash = argon2
            .hash_password(passphrase.as_bytes(), &salt)
            .map_err(|e| LedgerError::Encryption(format!("Key derivation failed: {}", e)))?;

        let hash_output = hash
            .hash
            .ok_or_else(|| LedgerError::Encryption("No hash output generated".to_string()))?;

        let hash_bytes = hash_output.as_bytes();
        if hash_bytes.len() < KEY_SIZE {
            return Err(LedgerError::Encryption(
                "Hash output too short for AES-256 key".to_string(),
            ));
        }

        Self::from_slice(&hash_bytes[..KEY_SIZE])
    }

    /// Load the key from `path`, or generate one and write it there
    ///
    /// Generation happens at most once per path: every later call loads the
    /// same bytes. The file is created with owner-only permissions.
    pub fn load_or_generate(path: &Path) -> LedgerResult<Self> {
        if path.exists() {
            let bytes = fs::read(path)
                .map_err(|e| LedgerError::Encryption(format!("Failed to read key file: {}", e)))?;
            let key = Self::from_slice(&bytes)?;
            debug!(path = %path.display(), "loaded store key");
            Ok(key)
        } else {
            let key = Self::generate();
            key.write_to(path)?;
            debug!(path = %path.display(), "generated new store key");
            Ok(key)
        }
    }

    /// Write the key bytes to `path` with owner-only permissions
    pub(crate) fn write_to(&self, path: &Path) -> LedgerResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LedgerError::Encryption(format!("Failed to create key directory: {}", e))
            })?;
        }
        fs::write(path, self.key)
            .map_err(|e| LedgerError::Encryption(format!("Failed to write key file: {}", e)))?;
        restrict_permissions(path)
            .map_err(|e| LedgerError::Encryption(format!("Failed to set key file permissions: {}", e)))?;
        Ok(())
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
