//! Recovery: locate a password inside a stored card.
//!
//! ```text
//! Parse inputs → Recompute offset → Read payload → [Open] → Slice → Emit
//! ```
//!
//! A run is a single pass with no retries and no persisted state.
//!
//! # Silent mismatch
//!
//! A wrong key or label, or a length running past the end of the card,
//! is not an error: the slice simply holds whatever units exist in range,
//! possibly none. Only the encrypted path can tell a wrong key apart,
//! because the cipher authenticates the payload.

use std::io::{self, Write};

use tracing::{debug, warn};

use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::crypto::{CipherError, CipherKind, Key, Password};
use crate::fs::{CardStore, StoreError};
use crate::offset::trash_length;
use crate::payload::{decode_units, Encoding};

/// Error types for recovery
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Everything a recovery run needs besides the store
#[derive(Debug, Clone)]
pub struct RecoverRequest<'a> {
    pub key: &'a Key,
    pub label: &'a str,
    /// Length of the original password in characters, never stored
    pub length: usize,
    /// Read the `.enc` card and open it with the cipher before slicing
    pub encrypted: bool,
}

impl RecoverRequest<'_> {
    /// Stored file this request reads
    #[must_use]
    pub fn file_name(&self) -> String {
        self.encoding().file_name(self.label)
    }

    fn encoding(&self) -> Encoding {
        if self.encrypted {
            Encoding::Bytes
        } else {
            Encoding::Text
        }
    }
}

/// `units[offset .. offset + len]`, clipped to what exists
#[must_use]
pub fn slice_units(units: &[char], offset: u64, len: usize) -> String {
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    units.iter().skip(start).take(len).collect()
}

/// Runs recovery against a store
pub struct Extractor<'a, S: CardStore> {
    store: &'a S,
    cipher: CipherKind,
}

impl<'a, S: CardStore> Extractor<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, cipher: CipherKind) -> Self {
        Self { store, cipher }
    }

    pub fn recover(&self, request: &RecoverRequest<'_>) -> Result<Password, ExtractError> {
        let offset = trash_length(request.key.as_str(), request.label);

        let file_name = request.file_name();
        let mut payload = self.store.read(&file_name)?;
        debug!(file = %file_name, bytes = payload.len(), "Read card");

        if request.encrypted {
            let cipher = self.cipher.for_card(request.key, request.label)?;
            payload = cipher.open(&payload)?;
        }

        let units = decode_units(&payload, request.encoding());
        let recovered = slice_units(&units, offset, request.length);
        let password = Password::new(recovered);
        if password.char_len() < request.length {
            debug!("Recovered fewer characters than requested");
        }
        Ok(password)
    }
}

// ============================================================
// EMIT
// ============================================================

/// Where a recovered password ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Clipboard,
    Shown,
    /// The clipboard failed and the password was shown instead
    ShownAfterClipboardFailure,
}

/// Hand the password to the clipboard, or print it when asked to (or when
/// the clipboard is unavailable)
pub fn deliver(
    password: &Password,
    show_in_clear: bool,
    clipboard: &mut dyn ClipboardSink,
    out: &mut dyn Write,
) -> io::Result<Delivery> {
    if show_in_clear {
        show(password, out)?;
        return Ok(Delivery::Shown);
    }

    match clipboard.copy(password.as_str()) {
        Ok(()) => {
            writeln!(
                out,
                "\nPassword recovered and copied to clipboard, Try not to paste prematurely\n"
            )?;
            Ok(Delivery::Clipboard)
        }
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable");
            report_fallback(&e, out)?;
            show(password, out)?;
            Ok(Delivery::ShownAfterClipboardFailure)
        }
    }
}

fn show(password: &Password, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\nrecovered: {}", password.as_str())
}

fn report_fallback(error: &ClipboardError, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Clipboard not usable ({error}), showing password in shell.")
}
