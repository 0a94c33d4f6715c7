//! Character pools used for password and filler material.

use rand::Rng;

/// Digits, in the keyboard order the pools have always used
pub const DIGITS: &str = "1234567890";

/// Upper and lower case ASCII letters
pub const LETTERS: &str = "QWERTYUIOPLKJHGFDSAZXCVBNMqwertyuiopasdfghjklzxcvbnm";

/// The predefined "all symbols" set.
///
/// Duplicates (`+`, `:`, `|`, `_`) are kept, they weight the draw.
pub const ALL_SYMBOLS: &str = ",./;\\[]!@#$%^&*()_+?|:+-=<>:|{}_";

/// Which symbols join digits and letters in the alphabet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SymbolPolicy {
    /// Alphanumeric only
    #[default]
    None,
    /// Exactly the given symbols (`-s`)
    Only(String),
    /// The whole predefined set (`-sA`)
    All,
    /// The predefined set minus the given symbols (`-sR`)
    AllExcept(String),
}

/// Shells tend to leave quotes in symbol arguments; they are never meant literally.
fn strip_quotes(raw: &str) -> String {
    raw.replace('\'', "")
}

impl SymbolPolicy {
    /// Policy for an explicit symbol argument
    #[must_use]
    pub fn only(raw: &str) -> Self {
        Self::Only(strip_quotes(raw))
    }

    /// Policy for an exclusion argument
    #[must_use]
    pub fn all_except(raw: &str) -> Self {
        Self::AllExcept(strip_quotes(raw))
    }

    /// The resolved symbol characters, in order, duplicates included
    #[must_use]
    pub fn symbols(&self) -> Vec<char> {
        match self {
            Self::None => Vec::new(),
            Self::Only(symbols) => symbols.chars().collect(),
            Self::All => ALL_SYMBOLS.chars().collect(),
            Self::AllExcept(taboos) => ALL_SYMBOLS
                .chars()
                .filter(|c| !taboos.contains(*c))
                .collect(),
        }
    }
}

/// Resolved character pools for one generation run
#[derive(Clone, Debug)]
pub struct Alphabet {
    letters: Vec<char>,
    digits_and_symbols: Vec<char>,
    full: Vec<char>,
}

impl Alphabet {
    #[must_use]
    pub fn new(policy: &SymbolPolicy) -> Self {
        let symbols = policy.symbols();
        let letters: Vec<char> = LETTERS.chars().collect();

        let mut digits_and_symbols: Vec<char> = DIGITS.chars().collect();
        digits_and_symbols.extend_from_slice(&symbols);

        let mut full: Vec<char> = DIGITS.chars().collect();
        full.extend(LETTERS.chars());
        full.extend_from_slice(&symbols);

        Self {
            letters,
            digits_and_symbols,
            full,
        }
    }

    /// Every character this alphabet can produce
    #[must_use]
    pub fn full(&self) -> &[char] {
        &self.full
    }

    /// Whether `c` can come out of this alphabet
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.full.contains(&c)
    }

    pub fn random_letter<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        pick(&self.letters, rng)
    }

    pub fn random_digit_or_symbol<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        pick(&self.digits_and_symbols, rng)
    }

    pub fn random_any<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        pick(&self.full, rng)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new(&SymbolPolicy::None)
    }
}

// pools always hold at least the digits
fn pick<R: Rng + ?Sized>(pool: &[char], rng: &mut R) -> char {
    pool[rng.random_range(0..pool.len())]
}
