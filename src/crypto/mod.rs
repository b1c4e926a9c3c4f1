//! Cryptographic functions for fintrack
//!
//! Provides AES-256-GCM encryption for the at-rest transaction store, a
//! generate-once key file, and Argon2id key derivation for
//! passphrase-based keys.

pub mod cipher;
pub mod keys;

pub use cipher::{EncryptedData, StoreCipher};
pub use keys::{KeyDerivationParams, StoreKey, KEY_SIZE};
