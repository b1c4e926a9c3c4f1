//! AES-256-GCM store cipher
//!
//! Authenticated encryption for data at rest. Every encryption generates a
//! fresh random nonce, so encrypting the same plaintext twice yields
//! different ciphertexts; both decrypt to the original. The cipher is a
//! plain value that callers construct and pass in. Nothing here reaches
//! for ambient state.

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

use super::keys::{KeyDerivationParams, StoreKey};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Encrypted payload with its nonce, both base64 encoded
///
/// This is the on-disk envelope: serialized as compact JSON it makes the
/// encrypted store self-describing and leaves room for algorithm upgrades
/// via the version tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The encrypted ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
    /// Version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    1
}

impl EncryptedData {
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Self {
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            version: 1,
        }
    }

    /// Serialize the envelope to JSON bytes
    pub fn to_json(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse an envelope from JSON bytes
    ///
    /// Anything that does not parse as an envelope is treated as a
    /// decryption failure, not a storage failure: the file exists but is
    /// not valid ciphertext.
    pub fn from_json(bytes: &[u8]) -> LedgerResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| LedgerError::Encryption(format!("Not a valid encrypted payload: {}", e)))
    }

    fn decode_nonce(&self) -> LedgerResult<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD
            .decode(&self.nonce)
            .map_err(|e| LedgerError::Encryption(format!("Invalid nonce encoding: {}", e)))
    }

    fn decode_ciphertext(&self) -> LedgerResult<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| LedgerError::Encryption(format!("Invalid ciphertext encoding: {}", e)))
    }
}

/// The cipher protecting the transaction store
///
/// Holds the active key and, when built from a key file, the path of that
/// file so the key can be backed up and restored.
pub struct StoreCipher {
    key: StoreKey,
    key_path: Option<PathBuf>,
}

impl StoreCipher {
    /// Build a cipher around an existing key
    pub fn new(key: StoreKey) -> Self {
        Self {
            key,
            key_path: None,
        }
    }

    /// Build a cipher from the key file at `key_path`, generating the key
    /// on first use
    pub fn load_or_generate(key_path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let key_path = key_path.into();
        let key = StoreKey::load_or_generate(&key_path)?;
        Ok(Self {
            key,
            key_path: Some(key_path),
        })
    }

    /// Build a cipher from a passphrase-derived key
    pub fn from_passphrase(passphrase: &str, params: &KeyDerivationParams) -> LedgerResult<Self> {
        Ok(Self::new(StoreKey::from_passphrase(passphrase, params)?))
    }

    /// Encrypt plaintext with a fresh random nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> LedgerResult<EncryptedData> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| LedgerError::Encryption(format!("Encryption failed: {}", e)))?;

        Ok(EncryptedData::new(&nonce_bytes, &ciphertext))
    }

    /// Decrypt an envelope produced by [`StoreCipher::encrypt`]
    ///
    /// Fails for a wrong key, a tampered nonce or ciphertext, or an
    /// unsupported version; no plaintext is produced in any failure case.
    pub fn decrypt(&self, encrypted: &EncryptedData) -> LedgerResult<Vec<u8>> {
        if encrypted.version != 1 {
            return Err(LedgerError::Encryption(format!(
                "Unsupported encryption version: {}",
                encrypted.version
            )));
        }

        let cipher = self.cipher()?;

        let nonce_bytes = encrypted.decode_nonce()?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(LedgerError::Encryption(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = encrypted.decode_ciphertext()?;

        cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
            LedgerError::Encryption("Decryption failed: invalid key or corrupted data".to_string())
        })
    }

    /// Encrypt the file at `src` into an envelope file at `dst`
    pub fn encrypt_file(&self, src: &Path, dst: &Path) -> LedgerResult<()> {
        let plaintext = fs::read(src).map_err(|e| {
            LedgerError::Encryption(format!("Failed to read {}: {}", src.display(), e))
        })?;
        let envelope = self.encrypt(&plaintext)?;
        fs::write(dst, envelope.to_json()?).map_err(|e| {
            LedgerError::Encryption(format!("Failed to write {}: {}", dst.display(), e))
        })?;
        Ok(())
    }

    /// Decrypt the envelope file at `src` into a plaintext file at `dst`
    pub fn decrypt_file(&self, src: &Path, dst: &Path) -> LedgerResult<()> {
        let bytes = fs::read(src).map_err(|e| {
            LedgerError::Encryption(format!("Failed to read {}: {}", src.display(), e))
        })?;
        let envelope = EncryptedData::from_json(&bytes)?;
        let plaintext = self.decrypt(&envelope)?;
        fs::write(dst, plaintext).map_err(|e| {
            LedgerError::Encryption(format!("Failed to write {}: {}", dst.display(), e))
        })?;
        Ok(())
    }

    /// Copy the active key to `dest` (creating parent directories)
    ///
    /// Without the key, the encrypted store is unrecoverable; a backup is
    /// the only way back from a lost key file.
    pub fn backup_key(&self, dest: &Path) -> LedgerResult<()> {
        self.key.write_to(dest)
    }

    /// Replace the active key with the one stored at `src`
    ///
    /// Overwrites the managed key file and swaps the in-memory key, so
    /// every operation after this call uses the restored key. Requires a
    /// cipher built with [`StoreCipher::load_or_generate`].
    pub fn restore_key(&mut self, src: &Path) -> LedgerResult<()> {
        let key_path = self.key_path.clone().ok_or_else(|| {
            LedgerError::Encryption("No key file is associated with this cipher".to_string())
        })?;
        if !src.exists() {
            return Err(LedgerError::Encryption(format!(
                "Backup key file not found: {}",
                src.display()
            )));
        }
        let bytes = fs::read(src)
            .map_err(|e| LedgerError::Encryption(format!("Failed to read backup key: {}", e)))?;
        let key = StoreKey::from_slice(&bytes)?;
        key.write_to(&key_path)?;
        self.key = key;
        Ok(())
    }

    /// Path of the managed key file, when there is one
    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    fn cipher(&self) -> LedgerResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cipher() -> StoreCipher {
        StoreCipher::new(StoreKey::generate())
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = test_cipher();
        let plaintext = b"id,date,amount\nabc,2023-01-15,110.00\n";

        let encrypted = cipher.encrypt(plaintext).unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();

        assert_eq!(plaintext.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_encryption_is_non_deterministic() {
        let cipher = test_cipher();
        let plaintext = b"same plaintext";

        let first = cipher.encrypt(plaintext).unwrap();
        let second = cipher.encrypt(plaintext).unwrap();

        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
        assert_eq!(cipher.decrypt(&first).unwrap(), plaintext);
        assert_eq!(cipher.decrypt(&second).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = test_cipher();
        let other = test_cipher();

        let encrypted = cipher.encrypt(b"secret").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let cipher = test_cipher();
        let mut encrypted = cipher.encrypt(b"secret").unwrap();

        let mut raw = STANDARD.decode(&encrypted.ciphertext).unwrap();
        raw[0] ^= 0xFF;
        encrypted.ciphertext = STANDARD.encode(&raw);

        let err = cipher.decrypt(&encrypted).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Encryption error: Decryption failed: invalid key or corrupted data"
        );
    }

    #[test]
    fn test_unsupported_version_fails() {
        let cipher = test_cipher();
        let mut encrypted = cipher.encrypt(b"secret").unwrap();
        encrypted.version = 9;
        assert!(cipher.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_garbage_envelope_is_encryption_error() {
        let err = EncryptedData::from_json(b"not json at all").unwrap_err();
        assert!(matches!(err, LedgerError::Encryption(_)));
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt(b"").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), b"");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let cipher = test_cipher();

        let plain = dir.path().join("plain.csv");
        let sealed = dir.path().join("plain.csv.enc");
        let recovered = dir.path().join("recovered.csv");

        fs::write(&plain, b"name,budget_limit\nFood,100.00\n").unwrap();
        cipher.encrypt_file(&plain, &sealed).unwrap();

        let on_disk = fs::read(&sealed).unwrap();
        assert!(EncryptedData::from_json(&on_disk).is_ok());
        assert!(!on_disk.windows(4).any(|w| w == b"Food"));

        cipher.decrypt_file(&sealed, &recovered).unwrap();
        assert_eq!(
            fs::read(&recovered).unwrap(),
            b"name,budget_limit\nFood,100.00\n"
        );
    }

    #[test]
    fn test_backup_and_restore_key() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("data").join(".ledger.key");
        let backup_path = dir.path().join("backup").join("ledger.key.bak");

        let cipher = StoreCipher::load_or_generate(&key_path).unwrap();
        let encrypted = cipher.encrypt(b"survives key loss").unwrap();
        cipher.backup_key(&backup_path).unwrap();

        // Simulate losing the key file: a fresh key is generated and the
        // old payload becomes unreadable
        fs::remove_file(&key_path).unwrap();
        let mut replacement = StoreCipher::load_or_generate(&key_path).unwrap();
        assert!(replacement.decrypt(&encrypted).is_err());

        replacement.restore_key(&backup_path).unwrap();
        assert_eq!(
            replacement.decrypt(&encrypted).unwrap(),
            b"survives key loss"
        );
    }

    #[test]
    fn test_restore_missing_backup_fails() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join(".ledger.key");
        let mut cipher = StoreCipher::load_or_generate(&key_path).unwrap();
        assert!(cipher.restore_key(&dir.path().join("nope.key")).is_err());
    }

    #[test]
    fn test_restore_requires_managed_key_file() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("backup.key");
        StoreKey::generate().write_to(&backup).unwrap();

        let mut cipher = StoreCipher::new(StoreKey::generate());
        assert!(cipher.restore_key(&backup).is_err());
    }
}
