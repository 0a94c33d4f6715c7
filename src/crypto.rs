//! Secret types and the cipher used by encrypted cards.
//!
//! Encrypted cards are byte-mode record streams sealed by a `CardCipher`.
//! The cipher is a strategy chosen by configuration:
//! - `aes-gcm`: AES-256-GCM, key = HKDF-SHA256(ikm = key, salt = label),
//!   a fresh 96-bit nonce is prefixed to the ciphertext
//! - `none`: identity, the record stream is stored as is
//!
//! # Security Notes
//!
//! - The card scheme itself is obfuscation, not confidentiality. The cipher
//!   only wraps the payload of `-e` cards.
//! - **Zeroize on drop**: `Key`, `Password` and derived cipher keys are
//!   cleared when dropped

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::logging::Redacted;

/// Error types for cipher operations
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("Key derivation failed")]
    KeyDerivationFailed,
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed (wrong key, wrong label or corrupted card)")]
    DecryptionFailed,
    #[error("Invalid ciphertext length")]
    InvalidLength,
}

/// Domain separation for the card cipher key
const CIPHER_KEY_INFO: &[u8] = b"pincard-card-cipher-v1";

/// AES-GCM nonce size
pub const NONCE_SIZE: usize = 12;

/// AES-GCM tag size
pub const TAG_SIZE: usize = 16;

// ============================================================
// SECRETS
// ============================================================

/// The user's secret. Never persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key(String);

impl Key {
    /// Wrap a key; empty keys are refused
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&Redacted(())).finish()
    }
}

/// Generated or recovered password material
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: String) -> Self {
        Self(password)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the unit recovery slices in
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&Redacted(())).finish()
    }
}

// ============================================================
// CIPHER STRATEGY
// ============================================================

/// Reversible transform applied to encrypted card payloads
pub trait CardCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// Which cipher seals encrypted cards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherKind {
    #[default]
    AesGcm,
    None,
}

impl CipherKind {
    /// Instantiate the cipher for one card
    pub fn for_card(self, key: &Key, label: &str) -> Result<Box<dyn CardCipher>, CipherError> {
        Ok(match self {
            Self::AesGcm => Box::new(AesGcmCipher::derive(key, label)?),
            Self::None => Box::new(NoCipher),
        })
    }
}

/// Identity cipher
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCipher;

impl CardCipher for NoCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(plaintext.to_vec())
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(sealed.to_vec())
    }
}

/// AES-256-GCM keyed from the card's key and label
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

/// Derive the 256-bit card cipher key
pub fn derive_cipher_key(key: &Key, label: &str) -> Result<Zeroizing<[u8; 32]>, CipherError> {
    let hkdf = Hkdf::<Sha256>::new(Some(label.as_bytes()), key.as_str().as_bytes());
    let mut okm = Zeroizing::new([0u8; 32]);
    hkdf.expand(CIPHER_KEY_INFO, &mut *okm)
        .map_err(|_| CipherError::KeyDerivationFailed)?;
    Ok(okm)
}

impl AesGcmCipher {
    pub fn derive(key: &Key, label: &str) -> Result<Self, CipherError> {
        let okm = derive_cipher_key(key, label)?;
        let cipher =
            Aes256Gcm::new_from_slice(&*okm).map_err(|_| CipherError::KeyDerivationFailed)?;
        Ok(Self { cipher })
    }

    fn generate_nonce() -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce);
        nonce
    }
}

impl CardCipher for AesGcmCipher {
    /// Output: nonce (12 bytes) || ciphertext || tag (16 bytes)
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = Self::generate_nonce();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::InvalidLength);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn test_empty_key_refused() {
        assert!(Key::new("").is_none());
        assert_eq!(key("k").as_str(), "k");
    }

    #[test]
    fn test_secrets_never_print() {
        let k = key("hunter2");
        let p = Password::new("Pa$$".to_string());
        assert!(!format!("{:?}", k).contains("hunter2"));
        assert!(!format!("{:?}", p).contains("Pa$$"));
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(Password::new("é€x".to_string()).char_len(), 3);
    }

    #[test]
    fn test_cipher_key_is_deterministic() {
        let a = derive_cipher_key(&key("secret"), "mail").unwrap();
        let b = derive_cipher_key(&key("secret"), "mail").unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_cipher_key_depends_on_label() {
        let a = derive_cipher_key(&key("secret"), "mail").unwrap();
        let b = derive_cipher_key(&key("secret"), "bank").unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_aes_gcm_roundtrip() {
        let cipher = AesGcmCipher::derive(&key("secret"), "mail").unwrap();
        let sealed = cipher.seal(b"records").unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + 7 + TAG_SIZE);
        assert_eq!(cipher.open(&sealed).unwrap(), b"records");
    }

    #[test]
    fn test_nonces_differ_between_seals() {
        let cipher = AesGcmCipher::derive(&key("secret"), "mail").unwrap();
        assert_ne!(cipher.seal(b"same").unwrap(), cipher.seal(b"same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = AesGcmCipher::derive(&key("secret"), "mail")
            .unwrap()
            .seal(b"records")
            .unwrap();
        let other = AesGcmCipher::derive(&key("terces"), "mail").unwrap();
        assert!(matches!(other.open(&sealed), Err(CipherError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = AesGcmCipher::derive(&key("secret"), "mail").unwrap();
        let mut sealed = cipher.seal(b"records").unwrap();
        sealed[NONCE_SIZE] ^= 0xFF;
        assert!(cipher.open(&sealed).is_err());
    }

    #[test]
    fn test_short_input_is_invalid_length() {
        let cipher = AesGcmCipher::derive(&key("secret"), "mail").unwrap();
        assert!(matches!(cipher.open(&[0u8; 8]), Err(CipherError::InvalidLength)));
    }

    #[test]
    fn test_no_cipher_is_identity() {
        let cipher = CipherKind::None.for_card(&key("k"), "l").unwrap();
        assert_eq!(cipher.seal(b"abc").unwrap(), b"abc");
        assert_eq!(cipher.open(b"abc").unwrap(), b"abc");
    }

    #[test]
    fn test_cipher_kind_serde_names() {
        assert_eq!(serde_json::to_string(&CipherKind::AesGcm).unwrap(), "\"aes-gcm\"");
        let kind: CipherKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, CipherKind::None);
    }
}
