//! Word lists for word-mode generation.
//!
//! A list is plain text, one word per line. Words are title-cased on load so
//! concatenated words stay readable ("MapleOtterRiver").

use std::fs;
use std::path::Path;

const BUILTIN_WORDS: &str = include_str!("wordlist.txt");

/// Anything that can hand out candidate words
pub trait WordSource {
    fn words(&self) -> &[String];
}

/// In-memory word list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Parse a newline separated list, keeping words of at most
    /// `max_word_length` characters when a limit is given
    #[must_use]
    pub fn from_lines(text: &str, max_word_length: Option<usize>) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| max_word_length.map_or(true, |max| line.chars().count() <= max))
            .map(title_case)
            .collect();
        Self { words }
    }

    /// Load a word list file
    pub fn from_file(path: &Path, max_word_length: Option<usize>) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_lines(&text, max_word_length))
    }

    /// The list shipped with the crate
    #[must_use]
    pub fn builtin(max_word_length: Option<usize>) -> Self {
        Self::from_lines(BUILTIN_WORDS, max_word_length)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for WordList {
    fn words(&self) -> &[String] {
        &self.words
    }
}

impl From<Vec<String>> for WordList {
    fn from(words: Vec<String>) -> Self {
        Self { words }
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut previous_alpha = false;
    for c in word.chars() {
        if previous_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_alpha = c.is_alphabetic();
    }
    out
}
