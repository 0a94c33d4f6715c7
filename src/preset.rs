//! Named shortcuts that expand to fixed generation options.
//!
//! A preset only produces a `MakeOptions`; nothing downstream knows one
//! was used. Explicit flags given alongside a preset override it.
//!
//! Growth never scales a word count, so `QuickWords` yields exactly
//! `QUICK_WORD_COUNT` words.

use crate::alphabet::SymbolPolicy;
use crate::card::MakeOptions;
use crate::generator::{GeneratorOptions, Growth, WordMode};

/// Growth used by both presets
pub const QUICK_GROWTH: i8 = 3;

/// Length limit used by both presets
pub const QUICK_LENGTH_LIMIT: usize = 32;

/// Word count of the `quick-words` preset
pub const QUICK_WORD_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// All symbols, padded, growth 3, limit 32
    Quick,
    /// `Quick` plus word mode with five words
    QuickWords,
}

impl Preset {
    /// Options this preset stands for
    #[must_use]
    pub fn expand(self) -> MakeOptions {
        let word_mode = match self {
            Self::Quick => None,
            Self::QuickWords => Some(WordMode {
                count: QUICK_WORD_COUNT,
            }),
        };
        MakeOptions {
            generator: GeneratorOptions {
                symbols: SymbolPolicy::All,
                growth: Growth::new(QUICK_GROWTH).unwrap_or_default(),
                length_limit: Some(QUICK_LENGTH_LIMIT),
                word_mode,
            },
            pad: true,
            ..MakeOptions::default()
        }
    }
}
