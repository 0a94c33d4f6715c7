//! Storage root and `config.json`.
//!
//! All cards live under one storage root: `--root` when given, else the
//! platform data directory joined with `files`. The root may hold an
//! optional `config.json`:
//!
//! ```json
//! {
//!   "word_list": "words.txt",
//!   "max_word_length": 8,
//!   "cipher": "aes-gcm",
//!   "clipboard_command": ["wl-copy"],
//!   "recover": { "show_in_clear": false, "encrypted": false }
//! }
//! ```
//!
//! Every field is optional. A relative `word_list` is resolved against
//! the storage root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::CipherKind;
use crate::words::WordList;

/// Name of the configuration file inside the storage root
pub const CONFIG_FILE: &str = "config.json";

/// Subdirectory of the data directory that holds cards
pub const FILES_DIR: &str = "files";

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No data directory available on this platform, pass --root")]
    NoDataDir,
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Defaults for recovery flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoverDefaults {
    pub show_in_clear: bool,
    pub encrypted: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// Word list for word mode, one word per line
    pub word_list: Option<PathBuf>,
    /// Words longer than this are skipped when loading
    pub max_word_length: Option<usize>,
    /// Cipher sealing encrypted cards
    pub cipher: CipherKind,
    /// argv of the clipboard copy command; empty means detect
    pub clipboard_command: Vec<String>,
    pub recover: RecoverDefaults,
}

impl CardConfig {
    /// Load `config.json` from `root`; a missing file yields defaults
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Configured word list, or the built-in one
    pub fn load_words(&self, root: &Path) -> Result<WordList, ConfigError> {
        match &self.word_list {
            Some(file) => {
                let path = root.join(file);
                WordList::from_file(&path, self.max_word_length)
                    .map_err(|source| ConfigError::Read { path, source })
            }
            None => Ok(WordList::builtin(self.max_word_length)),
        }
    }
}

/// `<data dir>/files` for this application
pub fn default_root() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("", "", "pincard")
        .map(|dirs| dirs.data_dir().join(FILES_DIR))
        .ok_or(ConfigError::NoDataDir)
}

/// The explicit root if any, else the default one
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(root) => Ok(root),
        None => default_root(),
    }
}
