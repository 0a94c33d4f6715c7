//! Pincard - passwords hidden behind key-derived filler
//!
//! A card is a file holding random filler followed by a generated password.
//! The filler length is derived from the key and the label, so only someone
//! who knows both (and the password length) can find the password again:
//! - Offset = sum(key codes) XOR sum(label codes), never stored
//! - Text cards (`.pad`) are UTF-8; byte cards (`.enc`) pack every character
//!   as a big-endian `u32` and are sealed by a pluggable cipher
//! - Secrets are zeroized on drop and never logged
//!
//! ## Architecture
//!
//! ```text
//! makepin                               recoverpin
//!    ↓ cli::parse_make                     ↓ cli::parse_recover
//! CardManager::generate                 CardManager::recover
//!    ├── PasswordGenerator                 └── Extractor
//!    ├── offset::trash_length                  ├── offset::trash_length
//!    ├── PayloadComposer                      ├── CardCipher::open
//!    └── CardCipher::seal                     ├── slice_units
//!    ↓                                         ↓ deliver → ClipboardSink
//! CardStore (DirStore / InMemoryStore)
//! ```
//!
//! The scheme is obfuscation, not encryption: offsets are order-insensitive
//! and a wrong key on a text card silently yields the wrong slice.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod alphabet;
pub mod card;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod crypto;
pub mod extract;
pub mod fs;
pub mod generator;
pub mod logging;
pub mod offset;
pub mod payload;
pub mod preset;
pub mod words;

pub use alphabet::{Alphabet, SymbolPolicy, ALL_SYMBOLS, DIGITS, LETTERS};
pub use card::{CardError, CardManager, GeneratedCard, MakeOptions};
pub use clipboard::{ClipboardError, ClipboardSink, CommandClipboard, MemoryClipboard};
pub use config::{default_root, resolve_root, CardConfig, ConfigError, RecoverDefaults};
pub use crypto::{AesGcmCipher, CardCipher, CipherError, CipherKind, Key, NoCipher, Password};
pub use extract::{deliver, slice_units, Delivery, ExtractError, Extractor, RecoverRequest};
pub use fs::{CardStore, DirStore, InMemoryStore, StoreError};
pub use generator::{
    seed_material, GenerateError, GeneratorOptions, Growth, PasswordGenerator, WordMode,
    DEFAULT_WORD_COUNT, SEED_LENGTH,
};
pub use offset::{code_sum, trash_length};
pub use payload::{decode_units, encode_records, Encoding, PayloadComposer, PayloadError};
pub use preset::Preset;
pub use words::{WordList, WordSource};
