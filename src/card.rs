//! Card manager - both paths over an injected store.
//!
//! # Generation
//!
//! ```text
//! options → PasswordGenerator → password
//! (key, label) → trash_length → offset
//! PayloadComposer(offset, password) → payload → [seal] → store
//! ```
//!
//! # Recovery
//!
//! Delegated to `Extractor`; see `extract`.
//!
//! # Security Properties
//!
//! - The key and the offset are never stored or logged
//! - Only the cipher of encrypted cards offers confidentiality; text cards
//!   are obfuscated, not protected

use std::io::{self, Write};
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::crypto::{CipherError, CipherKind, Key, Password};
use crate::extract::{ExtractError, Extractor, RecoverRequest};
use crate::fs::{CardStore, StoreError};
use crate::generator::{GenerateError, GeneratorOptions, PasswordGenerator};
use crate::offset::trash_length;
use crate::payload::{Encoding, PayloadComposer, PayloadError};
use crate::words::WordList;

/// Error types for card operations
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Key must not be empty")]
    EmptyKey,
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ExtractError> for CardError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Store(e) => Self::Store(e),
            ExtractError::Cipher(e) => Self::Cipher(e),
        }
    }
}

/// Everything `makepin` can be asked for
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MakeOptions {
    pub generator: GeneratorOptions,
    /// Write `offset` filler units before the password
    pub pad: bool,
    /// Byte-mode card sealed by the cipher; implies `pad`
    pub encrypt: bool,
    /// Generate and report only
    pub no_write: bool,
}

impl MakeOptions {
    #[must_use]
    pub fn padded(&self) -> bool {
        self.pad || self.encrypt
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        if self.encrypt {
            Encoding::Bytes
        } else {
            Encoding::Text
        }
    }
}

/// Outcome of a generation run
#[derive(Debug)]
pub struct GeneratedCard {
    pub password: Password,
    /// `None` when nothing was written
    pub file_name: Option<String>,
    pub padded: bool,
    pub encrypted: bool,
}

impl GeneratedCard {
    /// Print the generation report
    pub fn write_report(&self, out: &mut dyn Write, root: &Path) -> io::Result<()> {
        let file = match &self.file_name {
            Some(name) => root.join(name).display().to_string(),
            None => "(not written)".to_string(),
        };
        writeln!(out, "\nnew password: {}", self.password.as_str())?;
        writeln!(out, "length: {}", self.password.char_len())?;
        writeln!(out, "file: {file}")?;
        writeln!(out, "padding: {}", self.padded)?;
        writeln!(out, "encryption: {}", self.encrypted)
    }
}

/// Generates and recovers cards in a store
pub struct CardManager<S: CardStore> {
    store: S,
    cipher: CipherKind,
    words: WordList,
}

impl<S: CardStore> CardManager<S> {
    /// Default cipher and the built-in word list
    pub fn new(store: S) -> Self {
        Self::with_config(store, CipherKind::default(), WordList::builtin(None))
    }

    pub fn with_config(store: S, cipher: CipherKind, words: WordList) -> Self {
        Self {
            store,
            cipher,
            words,
        }
    }

    /// Generate a password and store its card
    pub fn generate(
        &mut self,
        key: &Key,
        label: &str,
        options: &MakeOptions,
    ) -> Result<GeneratedCard, CardError> {
        self.generate_with_rng(&mut rand::rng(), key, label, options)
    }

    /// `generate` with a caller-supplied RNG
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        key: &Key,
        label: &str,
        options: &MakeOptions,
    ) -> Result<GeneratedCard, CardError> {
        let generator = PasswordGenerator::new(&options.generator, &self.words)?;
        let password = generator.generate(rng, key.as_str(), label)?;
        debug!(units = options.generator.output_units(), "Generated password");

        let padded = options.padded();
        if options.no_write {
            return Ok(GeneratedCard {
                password,
                file_name: None,
                padded,
                encrypted: options.encrypt,
            });
        }

        let offset = trash_length(key.as_str(), label);
        let mut payload = PayloadComposer::new(generator.alphabet()).compose(
            rng,
            offset,
            &password,
            padded,
            options.encoding(),
        )?;
        if options.encrypt {
            payload = self.cipher.for_card(key, label)?.seal(&payload)?;
        }

        let file_name = options.encoding().file_name(label);
        self.store.write(&file_name, &payload)?;
        info!(file = %file_name, padded, encrypted = options.encrypt, "Card written");

        Ok(GeneratedCard {
            password,
            file_name: Some(file_name),
            padded,
            encrypted: options.encrypt,
        })
    }

    /// Recover a password from its card
    pub fn recover(&self, request: &RecoverRequest<'_>) -> Result<Password, CardError> {
        let password = Extractor::new(&self.store, self.cipher).recover(request)?;
        info!(file = %request.file_name(), "Card read");
        Ok(password)
    }
}
