//! Clipboard sink used when a recovered password is not shown in clear.
//!
//! `CommandClipboard` pipes the password into a copy command; the command
//! is either configured or detected from the usual platform tools.
//! `MemoryClipboard` records what was copied, for tests.

use std::cell::RefCell;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::rc::Rc;

use tracing::debug;

/// Copy commands tried in order when none is configured
const KNOWN_COMMANDS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["clip"],
];

/// Error types for clipboard delivery
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("No clipboard command available")]
    Unavailable,
    #[error("Clipboard command `{command}` failed: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Clipboard command `{0}` exited unsuccessfully")]
    CommandFailed(String),
}

/// Destination for recovered passwords
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

// ============================================================
// COMMAND CLIPBOARD
// ============================================================

/// Copies by writing to the stdin of an external command
#[derive(Debug, Clone, Default)]
pub struct CommandClipboard {
    argv: Option<Vec<String>>,
}

impl CommandClipboard {
    /// Use the given argv; an empty list falls back to detection
    #[must_use]
    pub fn configured(argv: Vec<String>) -> Self {
        if argv.is_empty() {
            Self::detect()
        } else {
            Self { argv: Some(argv) }
        }
    }

    /// First known copy command found on `PATH`
    #[must_use]
    pub fn detect() -> Self {
        let argv = KNOWN_COMMANDS
            .iter()
            .find(|argv| on_path(argv[0]))
            .map(|argv| argv.iter().map(|s| (*s).to_string()).collect());
        Self { argv }
    }
}

impl ClipboardSink for CommandClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let argv = self.argv.as_ref().ok_or(ClipboardError::Unavailable)?;
        let (program, args) = argv.split_first().ok_or(ClipboardError::Unavailable)?;
        let spawn_err = |source| ClipboardError::Spawn {
            command: program.clone(),
            source,
        };

        debug!(command = %program, "Copying to clipboard");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(spawn_err)?;
        }
        let status = child.wait().map_err(spawn_err)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(program.clone()))
        }
    }
}

fn on_path(program: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| {
            let candidate = dir.join(program);
            candidate.is_file() || candidate.with_extension("exe").is_file()
        })
    })
}

// ============================================================
// MEMORY CLIPBOARD
// ============================================================

/// In-memory clipboard for testing
/// Clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
    fail: bool,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that always reports `Unavailable`
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Unavailable);
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}
