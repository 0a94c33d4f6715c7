//! Password material generation.
//!
//! Character mode starts from seed material (the SHA-256 hex digest of
//! `label ++ key`), scrambles it position by position, then grows or cuts
//! it to the growth-scaled target length. Word mode concatenates exactly
//! the requested number of random words instead. In both modes the length
//! limit is applied last.
//!
//! # Growth law
//!
//! `target = base * (4 + growth) / 4`, at least 1. With the 64 character
//! seed this gives 16, 32, 48, 64, 80, 96, 112 for growth -3..=3. Growth
//! only shapes character mode; a word count is taken as given.

use rand::seq::SliceRandom;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::alphabet::{Alphabet, SymbolPolicy};
use crate::crypto::Password;
use crate::words::WordSource;

/// Length of the hex seed material in characters
pub const SEED_LENGTH: usize = 64;

/// Words per password in word mode unless told otherwise
pub const DEFAULT_WORD_COUNT: usize = 3;

/// Error types for generation
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Growth factor {0} outside [-3, 3]")]
    GrowthOutOfRange(i8),
    #[error("Length limit must be positive")]
    ZeroLengthLimit,
    #[error("Word list is empty")]
    EmptyWordList,
}

/// Growth factor in `[-3, 3]`; scales the target output length
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Growth(i8);

impl Growth {
    pub const MIN: i8 = -3;
    pub const MAX: i8 = 3;

    pub fn new(value: i8) -> Result<Self, GenerateError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GenerateError::GrowthOutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> i8 {
        self.0
    }

    /// Apply the growth law to `base`
    #[must_use]
    pub fn scale(self, base: usize) -> usize {
        // 4 + growth is in 1..=7
        let factor = usize::from((4 + self.0).unsigned_abs());
        (base.saturating_mul(factor) / 4).max(1)
    }
}

/// Word mode settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordMode {
    /// Words concatenated before the length limit applies
    pub count: usize,
}

impl Default for WordMode {
    fn default() -> Self {
        Self {
            count: DEFAULT_WORD_COUNT,
        }
    }
}

/// Options that shape the password itself
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub symbols: SymbolPolicy,
    pub growth: Growth,
    /// Upper bound on characters, or on words in word mode
    pub length_limit: Option<usize>,
    pub word_mode: Option<WordMode>,
}

impl GeneratorOptions {
    /// Size of the output before the length limit, in characters or words
    #[must_use]
    pub fn target_units(&self) -> usize {
        match self.word_mode {
            Some(mode) => mode.count,
            None => self.growth.scale(SEED_LENGTH),
        }
    }

    /// Size of the output after the length limit
    #[must_use]
    pub fn output_units(&self) -> usize {
        let target = self.target_units();
        self.length_limit.map_or(target, |limit| target.min(limit))
    }
}

/// SHA-256 hex digest of `label ++ key`
#[must_use]
pub fn seed_material(key: &str, label: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds password material from options and an optional word source
pub struct PasswordGenerator<'a> {
    options: &'a GeneratorOptions,
    alphabet: Alphabet,
    words: &'a dyn WordSource,
}

impl<'a> PasswordGenerator<'a> {
    pub fn new(
        options: &'a GeneratorOptions,
        words: &'a dyn WordSource,
    ) -> Result<Self, GenerateError> {
        if options.length_limit == Some(0) {
            return Err(GenerateError::ZeroLengthLimit);
        }
        Ok(Self {
            options,
            alphabet: Alphabet::new(&options.symbols),
            words,
        })
    }

    /// Alphabet in effect, shared with the filler
    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        key: &str,
        label: &str,
    ) -> Result<Password, GenerateError> {
        let units = self.options.output_units();
        let text = match self.options.word_mode {
            Some(_) => self.pick_words(rng, units)?.concat(),
            None => self.scramble(rng, &seed_material(key, label), units),
        };
        Ok(Password::new(text))
    }

    fn scramble<R: Rng + ?Sized>(&self, rng: &mut R, seed: &str, units: usize) -> String {
        let mut chars: Vec<char> = seed
            .chars()
            .map(|c| {
                if c.is_ascii_alphabetic() && rng.random_ratio(5, 6) {
                    self.alphabet.random_letter(rng)
                } else if c.is_ascii_digit() && rng.random_ratio(5, 6) {
                    self.alphabet.random_digit_or_symbol(rng)
                } else {
                    c
                }
            })
            .collect();

        while chars.len() < units {
            chars.push(self.alphabet.random_any(rng));
        }
        chars.shuffle(rng);
        chars.truncate(units);
        chars.into_iter().collect()
    }

    fn pick_words<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<&'a str>, GenerateError> {
        let source: &'a dyn WordSource = self.words;
        let words = source.words();
        if words.is_empty() {
            return Err(GenerateError::EmptyWordList);
        }
        Ok((0..count)
            .map(|_| words[rng.random_range(0..words.len())].as_str())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ALL_SYMBOLS;
    use crate::words::WordList;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate(options: &GeneratorOptions, seed: u64) -> Password {
        let words = WordList::builtin(None);
        let generator = PasswordGenerator::new(options, &words).unwrap();
        generator
            .generate(&mut StdRng::seed_from_u64(seed), "key", "label")
            .unwrap()
    }

    #[test]
    fn test_growth_zero_is_neutral() {
        assert_eq!(Growth::default().scale(SEED_LENGTH), SEED_LENGTH);
        assert_eq!(Growth::default().scale(5), 5);
    }

    #[test]
    fn test_growth_law_values() {
        let lengths: Vec<usize> = (Growth::MIN..=Growth::MAX)
            .map(|g| Growth::new(g).unwrap().scale(SEED_LENGTH))
            .collect();
        assert_eq!(lengths, vec![16, 32, 48, 64, 80, 96, 112]);
    }

    #[test]
    fn test_growth_never_scales_to_zero() {
        assert_eq!(Growth::new(-3).unwrap().scale(1), 1);
    }

    #[test]
    fn test_growth_out_of_range_rejected() {
        assert!(matches!(Growth::new(4), Err(GenerateError::GrowthOutOfRange(4))));
        assert!(matches!(Growth::new(-4), Err(GenerateError::GrowthOutOfRange(-4))));
    }

    #[test]
    fn test_seed_material_is_hex_of_label_then_key() {
        let seed = seed_material("key", "label");
        assert_eq!(seed.len(), SEED_LENGTH);
        assert!(seed.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(seed, "a56659261beee022a3d8e0b69ffb0daac1740e770a09e2aaa3fc77a346ebbbfe");
        assert_ne!(seed, seed_material("label", "key"));
    }

    #[test]
    fn test_default_output_is_seed_length_alphanumeric() {
        let password = generate(&GeneratorOptions::default(), 1);
        assert_eq!(password.char_len(), SEED_LENGTH);
        assert!(password.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_all_symbols_stay_in_alphabet() {
        let options = GeneratorOptions {
            symbols: SymbolPolicy::All,
            growth: Growth::new(3).unwrap(),
            ..Default::default()
        };
        let password = generate(&options, 2);
        assert_eq!(password.char_len(), 112);
        assert!(password
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALL_SYMBOLS.contains(c)));
    }

    #[test]
    fn test_length_limit_truncates() {
        let options = GeneratorOptions {
            length_limit: Some(10),
            ..Default::default()
        };
        assert_eq!(generate(&options, 3).char_len(), 10);
    }

    #[test]
    fn test_zero_length_limit_rejected() {
        let options = GeneratorOptions {
            length_limit: Some(0),
            ..Default::default()
        };
        let words = WordList::default();
        assert!(matches!(
            PasswordGenerator::new(&options, &words),
            Err(GenerateError::ZeroLengthLimit)
        ));
    }

    #[test]
    fn test_same_rng_seed_same_password() {
        let options = GeneratorOptions::default();
        assert_eq!(generate(&options, 42), generate(&options, 42));
    }

    #[test]
    fn test_word_mode_counts_words() {
        let words = WordList::from(vec!["Alpha".to_string()]);
        let options = GeneratorOptions {
            word_mode: Some(WordMode { count: 4 }),
            ..Default::default()
        };
        let generator = PasswordGenerator::new(&options, &words).unwrap();
        let password = generator
            .generate(&mut StdRng::seed_from_u64(0), "k", "l")
            .unwrap();
        assert_eq!(password.as_str(), "AlphaAlphaAlphaAlpha");
    }

    #[test]
    fn test_word_mode_ignores_growth() {
        let options = GeneratorOptions {
            word_mode: Some(WordMode { count: 5 }),
            growth: Growth::new(3).unwrap(),
            ..Default::default()
        };
        assert_eq!(options.output_units(), 5);
    }

    #[test]
    fn test_huge_word_count_clipped_by_limit() {
        let words = WordList::from(vec!["Ab".to_string()]);
        let options = GeneratorOptions {
            word_mode: Some(WordMode { count: usize::MAX / 2 }),
            growth: Growth::new(3).unwrap(),
            length_limit: Some(3),
            ..Default::default()
        };
        assert_eq!(options.output_units(), 3);

        let generator = PasswordGenerator::new(&options, &words).unwrap();
        let password = generator
            .generate(&mut StdRng::seed_from_u64(0), "k", "l")
            .unwrap();
        assert_eq!(password.as_str(), "AbAbAb");
    }

    #[test]
    fn test_growth_scale_saturates() {
        assert_eq!(Growth::new(3).unwrap().scale(usize::MAX), usize::MAX / 4);
    }

    #[test]
    fn test_word_mode_limit_counts_words_not_chars() {
        let words = WordList::from(vec!["Word".to_string()]);
        let options = GeneratorOptions {
            word_mode: Some(WordMode { count: 8 }),
            length_limit: Some(6),
            ..Default::default()
        };
        let generator = PasswordGenerator::new(&options, &words).unwrap();
        let password = generator
            .generate(&mut StdRng::seed_from_u64(0), "k", "l")
            .unwrap();
        assert_eq!(options.output_units(), 6);
        assert_eq!(password.as_str(), "Word".repeat(6));
    }

    #[test]
    fn test_word_mode_needs_words() {
        let words = WordList::default();
        let options = GeneratorOptions {
            word_mode: Some(WordMode::default()),
            ..Default::default()
        };
        let generator = PasswordGenerator::new(&options, &words).unwrap();
        let err = generator
            .generate(&mut StdRng::seed_from_u64(0), "k", "l")
            .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyWordList));
    }
}
